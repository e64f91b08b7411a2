//! crates/book_savor_core/src/backup.rs
//!
//! The backup/export record exchanged with the mobile client's settings
//! screen. The JSON shape (camelCase field names, `YYYY-MM-DD` log dates)
//! is a boundary contract; the stats view must be reconstructible from the
//! `books` and `readingLogs` arrays alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Book, ReadingLog, Recording, Sentence};

/// A full catalog snapshot, as exported to or imported from a backup file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
    #[serde(default)]
    pub reading_logs: Vec<BackupLogEntry>,
}

/// A reading-log row as it travels in a backup file. The date stays a raw
/// string so that one malformed row cannot fail the whole restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupLogEntry {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub book_id: Uuid,
    pub date: String,
    pub pages_read: i32,
}

impl BackupData {
    /// Assembles an export record from the live catalog.
    pub fn from_catalog(
        books: Vec<Book>,
        sentences: Vec<Sentence>,
        recordings: Vec<Recording>,
        reading_logs: Vec<ReadingLog>,
    ) -> Self {
        let reading_logs = reading_logs
            .into_iter()
            .map(|l| BackupLogEntry {
                id: Some(l.id),
                book_id: l.book_id,
                date: l.date.to_string(),
                pages_read: l.pages_read,
            })
            .collect();
        Self {
            books,
            sentences,
            recordings,
            reading_logs,
        }
    }

    /// The log rows that parse cleanly. Rows with malformed dates or
    /// negative page counts are skipped rather than aborting the restore.
    pub fn valid_reading_logs(&self) -> Vec<ReadingLog> {
        self.reading_logs
            .iter()
            .filter(|l| l.pages_read >= 0)
            .filter_map(|l| {
                let date: NaiveDate = l.date.parse().ok()?;
                Some(ReadingLog {
                    id: l.id.unwrap_or_else(Uuid::new_v4),
                    book_id: l.book_id,
                    date,
                    pages_read: l.pages_read,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_mobile_backup_shape() {
        let json = r#"{
            "books": [{
                "id": "6f2b9a74-9f7a-4f43-9c2e-2f6b1a1f0001",
                "title": "Walden",
                "author": "Thoreau",
                "totalPages": 320,
                "currentPage": 120,
                "coverUri": null,
                "isbn": null,
                "createdAt": "2024-05-01T09:00:00Z",
                "updatedAt": "2024-06-02T21:30:00Z"
            }],
            "sentences": [],
            "recordings": [],
            "readingLogs": [{
                "bookId": "6f2b9a74-9f7a-4f43-9c2e-2f6b1a1f0001",
                "date": "2024-06-02",
                "pagesRead": 12
            }]
        }"#;

        let backup: BackupData = serde_json::from_str(json).unwrap();
        assert_eq!(backup.books.len(), 1);
        let logs = backup.valid_reading_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, 12);
        assert_eq!(logs[0].date.to_string(), "2024-06-02");
    }

    #[test]
    fn malformed_log_dates_are_skipped_not_fatal() {
        let json = r#"{
            "readingLogs": [
                { "bookId": "6f2b9a74-9f7a-4f43-9c2e-2f6b1a1f0001", "date": "2024-06-02", "pagesRead": 12 },
                { "bookId": "6f2b9a74-9f7a-4f43-9c2e-2f6b1a1f0001", "date": "not-a-date", "pagesRead": 8 },
                { "bookId": "6f2b9a74-9f7a-4f43-9c2e-2f6b1a1f0001", "date": "2024-06-03", "pagesRead": -4 }
            ]
        }"#;

        let backup: BackupData = serde_json::from_str(json).unwrap();
        let logs = backup.valid_reading_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, 12);
    }

    #[test]
    fn export_serializes_log_dates_as_plain_days() {
        let entry = ReadingLog {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            date: "2024-06-02".parse().unwrap(),
            pages_read: 12,
        };
        let backup = BackupData::from_catalog(vec![], vec![], vec![], vec![entry]);
        let json = serde_json::to_value(&backup).unwrap();
        assert_eq!(json["readingLogs"][0]["date"], "2024-06-02");
        assert_eq!(json["readingLogs"][0]["pagesRead"], 12);
    }
}
