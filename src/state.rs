use rust_decimal::Decimal;

use crate::db::{DbPool, OrmConn, orm_from_pool};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub tax_rate: Decimal,
}

impl AppState {
    pub fn new(pool: DbPool, tax_rate: Decimal) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            tax_rate,
        }
    }
}
