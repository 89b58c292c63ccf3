use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{error::ApiResult, main_lib::AppState};
use reserve_setting_core::{
    assets::{Asset, AssetRepositoryTrait},
    exchanges::{Exchange, ExchangeRepositoryTrait},
    trading_pairs::{TradingPair, TradingPairRepositoryTrait},
};

async fn list_assets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Asset>>> {
    let assets = state.asset_repository.list()?;
    Ok(Json(assets))
}

async fn get_asset(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Asset>> {
    let asset = state.asset_repository.get_by_id(id)?;
    Ok(Json(asset))
}

async fn list_exchanges(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Exchange>>> {
    let exchanges = state.exchange_repository.list()?;
    Ok(Json(exchanges))
}

async fn get_exchange(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Exchange>> {
    let exchange = state.exchange_repository.get_by_id(id)?;
    Ok(Json(exchange))
}

async fn list_exchange_trading_pairs(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TradingPair>>> {
    state.exchange_repository.get_by_id(id)?;
    let pairs = state.trading_pair_repository.list_by_exchange(id)?;
    Ok(Json(pairs))
}

async fn get_trading_pair(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TradingPair>> {
    let pair = state.trading_pair_repository.get_by_id(id)?;
    Ok(Json(pair))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list_assets))
        .route("/assets/{id}", get(get_asset))
        .route("/exchanges", get(list_exchanges))
        .route("/exchanges/{id}", get(get_exchange))
        .route(
            "/exchanges/{id}/trading-pairs",
            get(list_exchange_trading_pairs),
        )
        .route("/trading-pairs/{id}", get(get_trading_pair))
}
