//! CSV rendering of the order log. Uses the `csv` crate for safe quoting.

use crate::domain::Order;
use chrono::FixedOffset;

pub const CSV_HEADER: [&str; 11] = [
    "id",
    "created_at",
    "user_id",
    "username",
    "kind",
    "item",
    "platform",
    "quantity",
    "rate",
    "total",
    "status",
];

/// Convert orders to a comma-delimited CSV document with a header row.
///
/// Timestamps are rendered in `offset` (e.g. the shop's local time) as RFC 3339.
pub fn orders_to_csv(orders: &[Order], offset: FixedOffset) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;

    for order in orders {
        let id = order.id.map(|id| id.to_string()).unwrap_or_default();
        let created_at = order.created_at.with_timezone(&offset).to_rfc3339();
        // Newlines in free text would split a row for naive consumers
        let item = order.item.replace(['\n', '\r'], " ");
        wtr.write_record([
            id,
            created_at,
            order.user_id.to_string(),
            order.username.clone().unwrap_or_default(),
            order.kind.as_str().to_string(),
            item,
            order.platform.map(|p| p.to_string()).unwrap_or_default(),
            order.quantity.to_string(),
            order.rate.map(|r| r.to_string()).unwrap_or_default(),
            order.total.to_string(),
            order.status.as_str().to_string(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}
