//! Database models for exchanges.

use diesel::prelude::*;
use reserve_setting_core::exchanges::{Exchange, ExchangeUpdate, NewExchange};

/// Database model for exchanges
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeDB {
    pub id: i64,
    pub name: String,
    pub trading_fee_maker: Option<f64>,
    pub trading_fee_taker: Option<f64>,
    pub disable: bool,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::exchanges)]
pub struct NewExchangeDB {
    pub name: String,
    pub trading_fee_maker: Option<f64>,
    pub trading_fee_taker: Option<f64>,
    pub disable: bool,
}

/// Only the supplied fields are written.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::exchanges)]
pub struct ExchangeChangesetDB {
    pub trading_fee_maker: Option<f64>,
    pub trading_fee_taker: Option<f64>,
    pub disable: Option<bool>,
}

impl ExchangeChangesetDB {
    pub fn is_empty(&self) -> bool {
        self.trading_fee_maker.is_none()
            && self.trading_fee_taker.is_none()
            && self.disable.is_none()
    }
}

impl From<ExchangeDB> for Exchange {
    fn from(db: ExchangeDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            trading_fee_maker: db.trading_fee_maker,
            trading_fee_taker: db.trading_fee_taker,
            disable: db.disable,
        }
    }
}

impl From<NewExchange> for NewExchangeDB {
    fn from(domain: NewExchange) -> Self {
        Self {
            name: domain.name,
            trading_fee_maker: domain.trading_fee_maker,
            trading_fee_taker: domain.trading_fee_taker,
            disable: domain.disable,
        }
    }
}

impl From<&ExchangeUpdate> for ExchangeChangesetDB {
    fn from(update: &ExchangeUpdate) -> Self {
        Self {
            trading_fee_maker: update.trading_fee_maker,
            trading_fee_taker: update.trading_fee_taker,
            disable: update.disable,
        }
    }
}
