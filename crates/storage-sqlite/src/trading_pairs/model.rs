//! Database models for trading pairs.

use diesel::prelude::*;
use reserve_setting_core::trading_pairs::{
    NewTradingPair, TradingBy, TradingPair, TradingPairUpdate,
};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::trading_pairs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradingPairDB {
    pub id: i64,
    pub exchange_id: i64,
    pub base_id: i64,
    pub quote_id: i64,
    pub price_precision: i64,
    pub amount_precision: i64,
    pub amount_limit_min: f64,
    pub amount_limit_max: f64,
    pub price_limit_min: f64,
    pub price_limit_max: f64,
    pub min_notional: f64,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::trading_pairs)]
pub struct NewTradingPairDB {
    pub exchange_id: i64,
    pub base_id: i64,
    pub quote_id: i64,
    pub price_precision: i64,
    pub amount_precision: i64,
    pub amount_limit_min: f64,
    pub amount_limit_max: f64,
    pub price_limit_min: f64,
    pub price_limit_max: f64,
    pub min_notional: f64,
}

impl NewTradingPairDB {
    /// Builds the row for a pair whose legs are already resolved.
    pub fn resolved(exchange_id: i64, base_id: i64, quote_id: i64, pair: &NewTradingPair) -> Self {
        Self {
            exchange_id,
            base_id,
            quote_id,
            price_precision: pair.price_precision,
            amount_precision: pair.amount_precision,
            amount_limit_min: pair.amount_limit_min,
            amount_limit_max: pair.amount_limit_max,
            price_limit_min: pair.price_limit_min,
            price_limit_max: pair.price_limit_max,
            min_notional: pair.min_notional,
        }
    }
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::trading_pairs)]
pub struct TradingPairChangesetDB {
    pub price_precision: Option<i64>,
    pub amount_precision: Option<i64>,
    pub amount_limit_min: Option<f64>,
    pub amount_limit_max: Option<f64>,
    pub price_limit_min: Option<f64>,
    pub price_limit_max: Option<f64>,
    pub min_notional: Option<f64>,
}

impl TradingPairChangesetDB {
    pub fn is_empty(&self) -> bool {
        self.price_precision.is_none()
            && self.amount_precision.is_none()
            && self.amount_limit_min.is_none()
            && self.amount_limit_max.is_none()
            && self.price_limit_min.is_none()
            && self.price_limit_max.is_none()
            && self.min_notional.is_none()
    }
}

impl From<&TradingPairUpdate> for TradingPairChangesetDB {
    fn from(update: &TradingPairUpdate) -> Self {
        Self {
            price_precision: update.price_precision,
            amount_precision: update.amount_precision,
            amount_limit_min: update.amount_limit_min,
            amount_limit_max: update.amount_limit_max,
            price_limit_min: update.price_limit_min,
            price_limit_max: update.price_limit_max,
            min_notional: update.min_notional,
        }
    }
}

impl From<TradingPairDB> for TradingPair {
    fn from(db: TradingPairDB) -> Self {
        Self {
            id: db.id,
            exchange_id: db.exchange_id,
            base: db.base_id,
            quote: db.quote_id,
            price_precision: db.price_precision,
            amount_precision: db.amount_precision,
            amount_limit_min: db.amount_limit_min,
            amount_limit_max: db.amount_limit_max,
            price_limit_min: db.price_limit_min,
            price_limit_max: db.price_limit_max,
            min_notional: db.min_notional,
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::trading_by)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradingByDB {
    pub id: i64,
    pub asset_id: i64,
    pub trading_pair_id: i64,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::trading_by)]
pub struct NewTradingByDB {
    pub asset_id: i64,
    pub trading_pair_id: i64,
}

impl From<TradingByDB> for TradingBy {
    fn from(db: TradingByDB) -> Self {
        Self {
            id: db.id,
            asset_id: db.asset_id,
            trading_pair_id: db.trading_pair_id,
        }
    }
}
