//! SQLite-backed order log via libsql. Implements OrderLogPort.
//!
//! Single `orders` table with an autoincrement id; rows are only ever inserted.
//! Database file: data/orders.db

use crate::domain::{DomainError, Order, OrderStatus, Platform, Rate};
use crate::ports::OrderLogPort;
use chrono::{DateTime, Utc};
use libsql::{Database, Row, params};
use std::path::Path;
use tracing::info;

const ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    username TEXT,
    kind TEXT NOT NULL,
    item TEXT NOT NULL,
    platform TEXT,
    quantity INTEGER NOT NULL,
    rate_hundredths INTEGER,
    total INTEGER NOT NULL,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL
)"#;
const ORDERS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_orders_created ON orders (created_at DESC)";

const SELECT_COLUMNS: &str = "SELECT id, user_id, username, kind, item, platform, quantity, rate_hundredths, total, status, created_at FROM orders";

/// SQLite order log. One database file (orders.db) in the given base directory.
pub struct SqliteOrderLog {
    db: Database,
}

impl SqliteOrderLog {
    /// Connect to (or create) the database and ensure the schema exists.
    /// Call once at startup; the returned log is safe to share via Arc.
    ///
    /// WAL mode lets the export task read while an order is being written.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::OrderLog(e.to_string()))?;
        let db_path = base.join("orders.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::OrderLog(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::OrderLog(e.to_string()))?
            .is_some()
        {}

        conn.execute(ORDERS_TABLE, ())
            .await
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;
        conn.execute(ORDERS_INDEX, ())
            .await
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;

        info!(path = %db_path.display(), "order log connected");

        Ok(Self { db })
    }

    async fn query_orders(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Order>, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;
        let mut orders = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::OrderLog(e.to_string()))?
        {
            orders.push(row_to_order(&row)?);
        }
        Ok(orders)
    }
}

fn to_i64(value: u64, field: &str) -> Result<i64, DomainError> {
    i64::try_from(value)
        .map_err(|_| DomainError::OrderLog(format!("{} {} does not fit the order log", field, value)))
}

fn row_to_order(row: &Row) -> Result<Order, DomainError> {
    let err = |e: libsql::Error| DomainError::OrderLog(e.to_string());
    let id: i64 = row.get(0).map_err(err)?;
    let user_id: i64 = row.get(1).map_err(err)?;
    let username: Option<String> = row.get(2).ok();
    let kind: String = row.get(3).map_err(err)?;
    let item: String = row.get::<String>(4).unwrap_or_default();
    let platform: Option<String> = row.get(5).ok();
    let quantity: i64 = row.get(6).map_err(err)?;
    let rate_hundredths: Option<i64> = row.get(7).ok();
    let total: i64 = row.get(8).map_err(err)?;
    let status: String = row.get(9).map_err(err)?;
    let created_at: i64 = row.get(10).map_err(err)?;

    let corrupt = |what: &str| DomainError::OrderLog(format!("order {}: bad {}", id, what));
    Ok(Order {
        id: Some(id),
        user_id,
        username,
        kind: kind.parse().map_err(|_| corrupt("kind"))?,
        item,
        platform: platform
            .map(|p| p.parse::<Platform>())
            .transpose()
            .map_err(|_| corrupt("platform"))?,
        quantity: u64::try_from(quantity).map_err(|_| corrupt("quantity"))?,
        rate: rate_hundredths
            .and_then(|h| u64::try_from(h).ok())
            .and_then(Rate::from_hundredths),
        total: u64::try_from(total).map_err(|_| corrupt("total"))?,
        status: status.parse().map_err(|_| corrupt("status"))?,
        created_at: DateTime::<Utc>::from_timestamp(created_at, 0)
            .ok_or_else(|| corrupt("created_at"))?,
    })
}

#[async_trait::async_trait]
impl OrderLogPort for SqliteOrderLog {
    async fn append(&self, order: &Order) -> Result<Order, DomainError> {
        if order.status != OrderStatus::Confirmed {
            return Err(DomainError::OrderLog(
                "only confirmed orders are appended".into(),
            ));
        }
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::OrderLog(e.to_string()))?;
        let rate = order
            .rate
            .map(|r| to_i64(r.hundredths(), "rate"))
            .transpose()?;
        let platform = order.platform.map(|p| p.as_str());
        conn.execute(
            r#"
            INSERT INTO orders (user_id, username, kind, item, platform, quantity, rate_hundredths, total, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                order.user_id,
                order.username.clone(),
                order.kind.as_str(),
                order.item.as_str(),
                platform,
                to_i64(order.quantity, "quantity")?,
                rate,
                to_i64(order.total, "total")?,
                order.status.as_str(),
                order.created_at.timestamp()
            ],
        )
        .await
        .map_err(|e| DomainError::OrderLog(e.to_string()))?;
        let id = conn.last_insert_rowid();

        info!(
            order_id = id,
            user_id = order.user_id,
            kind = order.kind.as_str(),
            total = order.total,
            "order recorded"
        );

        let created_at = DateTime::<Utc>::from_timestamp(order.created_at.timestamp(), 0)
            .unwrap_or(order.created_at);
        Ok(Order {
            id: Some(id),
            created_at,
            ..order.clone()
        })
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Order>, DomainError> {
        let sql = format!("{} ORDER BY id DESC LIMIT ?1", SELECT_COLUMNS);
        self.query_orders(&sql, params![i64::from(limit)]).await
    }

    async fn all(&self) -> Result<Vec<Order>, DomainError> {
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        self.query_orders(&sql, ()).await
    }
}
