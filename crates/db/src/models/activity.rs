//! Activity row model.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;

use logbook_core::types::{ActivityId, Timestamp};

/// A row from the `activities` table.
///
/// Category and work mode are stored as their kebab-case wire tokens; the
/// validator guarantees only enum members ever reach an INSERT.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Activity {
    pub id: ActivityId,
    pub author: String,
    pub date: NaiveDate,
    pub title: String,
    pub category: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub work_mode: String,
    pub location: String,
    pub description: Option<String>,
    pub proof: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Activity {
    /// Format the row as the eight CSV export columns.
    pub fn csv_row(&self) -> [String; 8] {
        [
            self.date.format("%Y-%m-%d").to_string(),
            self.start_time.format("%H:%M").to_string(),
            self.end_time.format("%H:%M").to_string(),
            self.title.clone(),
            self.category.clone(),
            self.work_mode.clone(),
            self.location.clone(),
            self.description.clone().unwrap_or_default(),
        ]
    }
}
