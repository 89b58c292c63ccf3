use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{error::ApiResult, main_lib::AppState};
use reserve_setting_core::setting_change::{
    ChangeCatalog, SettingChange, SettingChangeProposal, SettingChangeServiceTrait,
};

#[derive(Serialize)]
struct StagedResponse {
    id: i64,
}

async fn stage_change(
    Path(catalog): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(change): Json<SettingChange>,
) -> ApiResult<(StatusCode, Json<StagedResponse>)> {
    let catalog: ChangeCatalog = catalog.parse()?;
    let id = state
        .setting_change_service
        .stage_change(catalog, change)
        .await?;
    Ok((StatusCode::CREATED, Json(StagedResponse { id })))
}

async fn list_proposals(
    Path(catalog): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SettingChangeProposal>>> {
    let catalog: ChangeCatalog = catalog.parse()?;
    let proposals = state.setting_change_service.list_proposals(catalog)?;
    Ok(Json(proposals))
}

async fn get_proposal(
    Path((catalog, id)): Path<(String, i64)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SettingChangeProposal>> {
    let catalog: ChangeCatalog = catalog.parse()?;
    let proposal = state.setting_change_service.get_proposal(catalog, id)?;
    Ok(Json(proposal))
}

async fn confirm_proposal(
    Path((catalog, id)): Path<(String, i64)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let catalog: ChangeCatalog = catalog.parse()?;
    state
        .setting_change_service
        .confirm_proposal(catalog, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reject_proposal(
    Path((catalog, id)): Path<(String, i64)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let catalog: ChangeCatalog = catalog.parse()?;
    state
        .setting_change_service
        .reject_proposal(catalog, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/setting-change/{catalog}",
            get(list_proposals).post(stage_change),
        )
        .route(
            "/setting-change/{catalog}/{id}",
            get(get_proposal)
                .put(confirm_proposal)
                .delete(reject_proposal),
        )
}
