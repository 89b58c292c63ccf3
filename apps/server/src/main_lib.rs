use std::collections::HashSet;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use reserve_setting_core::{
    assets::AssetRepositoryTrait,
    exchanges::{ExchangeRepositoryTrait, NewExchange},
    setting_change::{SettingChangeService, SettingChangeServiceTrait},
    trading_pairs::TradingPairRepositoryTrait,
};
use reserve_setting_storage_sqlite::{
    db, AssetRepository, ExchangeRepository, PendingObjectRepository, SettingChangeApplier,
    TradingPairRepository,
};

pub struct AppState {
    pub setting_change_service: Arc<dyn SettingChangeServiceTrait>,
    pub asset_repository: Arc<dyn AssetRepositoryTrait>,
    pub exchange_repository: Arc<dyn ExchangeRepositoryTrait>,
    pub trading_pair_repository: Arc<dyn TradingPairRepositoryTrait>,
}

/// Text output by default; `RS_LOG_FORMAT=json` switches to JSON lines.
/// Records emitted through the `log` facade by the library crates are
/// captured as well.
pub fn init_tracing() {
    let log_format = std::env::var("RS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let exchange_repository = Arc::new(ExchangeRepository::new(pool.clone(), writer.clone()));
    let trading_pair_repository =
        Arc::new(TradingPairRepository::new(pool.clone(), writer.clone()));
    let pending_repository = Arc::new(PendingObjectRepository::new(pool.clone(), writer.clone()));
    let applier = Arc::new(SettingChangeApplier::new(writer));
    seed_exchanges(exchange_repository.as_ref(), &config.exchanges).await?;

    // No venue connectivity is wired in; staged pairs keep the supplied values.
    let setting_change_service = Arc::new(SettingChangeService::new(
        asset_repository.clone(),
        exchange_repository.clone(),
        trading_pair_repository.clone(),
        pending_repository,
        applier,
        config.setting_change.clone(),
    ));

    Ok(Arc::new(AppState {
        setting_change_service,
        asset_repository,
        exchange_repository,
        trading_pair_repository,
    }))
}

/// Creates the configured exchanges that are not stored yet. They start
/// disabled and without fees until an `update_exchange` change sets both.
async fn seed_exchanges(
    exchange_repository: &dyn ExchangeRepositoryTrait,
    names: &[String],
) -> anyhow::Result<()> {
    let existing: HashSet<String> = exchange_repository
        .list()?
        .into_iter()
        .map(|exchange| exchange.name)
        .collect();
    for name in names.iter().filter(|name| !existing.contains(*name)) {
        let id = exchange_repository
            .create(NewExchange {
                name: name.clone(),
                trading_fee_maker: None,
                trading_fee_taker: None,
                disable: true,
            })
            .await?;
        tracing::info!("Seeded exchange {} ({})", name, id);
    }
    Ok(())
}
