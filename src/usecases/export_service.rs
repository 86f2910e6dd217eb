//! Export use case: CSV snapshot of the order log, on demand and on a weekly timer.
//!
//! Files are named by the local date in the configured UTC offset:
//! `<export_dir>/orders_YYYY-MM-DD.csv`. A second export on the same day replaces the file.

use crate::adapters::persistence::{orders_to_csv, write_atomic};
use crate::domain::DomainError;
use crate::ports::OrderLogPort;
use crate::usecases::NotificationDispatcher;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc, Weekday};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
}

/// Weekly export time: weekday and wall-clock time in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSchedule {
    weekday: Weekday,
    time: NaiveTime,
    offset: FixedOffset,
}

impl ExportSchedule {
    pub fn new(weekday: Weekday, time: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            weekday,
            time,
            offset,
        }
    }

    /// First scheduled instant strictly after `now`.
    pub fn next_run(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.offset);
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - local.weekday().num_days_from_monday())
            % 7;
        let date = local.date_naive() + Duration::days(i64::from(days_ahead));
        let utc_offset = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        let candidate = (date.and_time(self.time) - utc_offset).and_utc();
        if candidate > now {
            candidate
        } else {
            candidate + Duration::weeks(1)
        }
    }
}

pub struct ExportService {
    orders: Arc<dyn OrderLogPort>,
    export_dir: PathBuf,
    offset: FixedOffset,
}

impl ExportService {
    /// `offset` decides the date in the file name and the timestamps in the CSV.
    pub fn new(orders: Arc<dyn OrderLogPort>, export_dir: PathBuf, offset: FixedOffset) -> Self {
        Self {
            orders,
            export_dir,
            offset,
        }
    }

    pub async fn export_now(&self) -> Result<ExportReport, DomainError> {
        self.export_at(Utc::now()).await
    }

    /// Write every order to the file dated by `now`. A header-only file is written
    /// when there are no orders.
    pub async fn export_at(&self, now: DateTime<Utc>) -> Result<ExportReport, DomainError> {
        let orders = self.orders.all().await?;
        let csv = orders_to_csv(&orders, self.offset)
            .map_err(|e| DomainError::Export(format!("CSV rendering failed: {}", e)))?;

        let date = now.with_timezone(&self.offset).format("%Y-%m-%d");
        let path = self.export_dir.join(format!("orders_{}.csv", date));
        write_atomic(&path, csv.as_bytes())
            .await
            .map_err(|e| DomainError::Export(format!("write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), rows = orders.len(), "orders exported");
        Ok(ExportReport {
            path,
            rows: orders.len(),
        })
    }

    /// Export on every scheduled instant and tell the administrators. Runs until the
    /// task is dropped; failures are logged and reported, never fatal.
    pub async fn run_weekly(&self, schedule: ExportSchedule, notifier: Arc<NotificationDispatcher>) {
        loop {
            let now = Utc::now();
            let next = schedule.next_run(now);
            info!(next_run = %next.with_timezone(&schedule.offset), "weekly export scheduled");
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let notice = match self.export_now().await {
                Ok(report) => format!(
                    "Weekly export: {} orders written to {}",
                    report.rows,
                    report.path.display()
                ),
                Err(e) => {
                    error!(error = %e, "weekly export failed");
                    format!("Weekly export failed: {}", e)
                }
            };
            notifier.broadcast(&notice).await;
        }
    }
}
