//! Relational storage backends.
//!
//! Both backends keep users in a single `users` table created on startup:
//! `id` (auto-assigned 64-bit key), `name`, nullable `email`.

mod mysql;
mod postgres;

use std::time::Duration;

use sqlx::pool::PoolOptions;

use crate::config::SqlStorageConfig;
use crate::domain::User;

pub use mysql::MySqlUserStore;
pub use postgres::PgUserStore;

/// Column tuple selected by every read query.
type UserRow = (i64, String, Option<String>);

const SELECT_COLUMNS: &str = "id, name, email";

fn row_to_user((id, name, email): UserRow) -> User {
    User { id, name, email }
}

/// Pool options shared by both relational backends.
fn pool_options<DB: sqlx::Database>(config: &SqlStorageConfig) -> PoolOptions<DB> {
    PoolOptions::<DB>::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
}
