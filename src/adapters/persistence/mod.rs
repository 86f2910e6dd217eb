//! Local persistence: JSON data file for rates/catalog, SQLite order log, CSV export.

pub mod atomic_file;
pub mod csv_export;
pub mod sqlite_orders;
pub mod store_json;

pub use atomic_file::write_atomic;
pub use csv_export::orders_to_csv;
pub use sqlite_orders::SqliteOrderLog;
pub use store_json::{JsonStore, LoadOutcome};
