//! crates/book_savor_core/src/stats.rs
//!
//! Full statistics recompute over an in-memory snapshot of the catalog.
//! Always recomputed from scratch on refresh; there is no incremental
//! counter state to drift out of sync with the ground truth.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::domain::{Book, MonthlyPages, ReadingLog, Recording, Stats};

/// How many trailing months the pages histogram keeps.
const MONTHLY_WINDOW: usize = 6;

pub struct StatsAggregator;

impl StatsAggregator {
    /// Computes the full [`Stats`] snapshot from all books, reading logs,
    /// and recordings. Pure and infallible: empty input yields all-zero
    /// stats, and log entries with non-positive page counts are ignored.
    pub fn recompute(
        books: &[Book],
        logs: &[ReadingLog],
        recordings: &[Recording],
        today: NaiveDate,
    ) -> Stats {
        let total_books = books.len() as u32;
        let completed_books = books.iter().filter(|b| b.is_complete()).count() as u32;

        let total_pages_this_month = logs
            .iter()
            .filter(|l| {
                l.date.year() == today.year() && l.date.month() == today.month() && l.date <= today
            })
            .map(|l| i64::from(l.pages_read.max(0)))
            .sum();

        let total_recording_duration = recordings.iter().map(|r| r.duration_seconds).sum();

        Stats {
            total_books,
            completed_books,
            total_pages_this_month,
            total_recording_duration,
            streak_days: streak_days(logs, today),
            monthly_pages: monthly_pages(logs),
        }
    }
}

/// Length of the run of consecutive calendar days with reading activity,
/// anchored at today or yesterday.
///
/// A day counts when any book has a positive log entry on it. If the most
/// recent such day is older than yesterday the streak is 0: missing a day
/// breaks the chain, with a grace window only for "haven't logged today
/// yet".
fn streak_days(logs: &[ReadingLog], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = logs
        .iter()
        .filter(|l| l.pages_read > 0)
        .map(|l| l.date)
        .collect();

    let Some(&anchor) = days.iter().next_back() else {
        return 0;
    };
    let yesterday = today.pred_opt();
    if anchor != today && Some(anchor) != yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut cursor = anchor;
    while let Some(prev) = cursor.pred_opt() {
        if !days.contains(&prev) {
            break;
        }
        streak += 1;
        cursor = prev;
    }
    streak
}

/// Pages read per calendar month, most recent `MONTHLY_WINDOW` months,
/// presented in ascending chronological order for charting.
fn monthly_pages(logs: &[ReadingLog]) -> Vec<MonthlyPages> {
    let mut by_month: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for log in logs {
        if log.pages_read <= 0 {
            continue;
        }
        *by_month
            .entry((log.date.year(), log.date.month()))
            .or_default() += i64::from(log.pages_read);
    }

    let mut recent: Vec<MonthlyPages> = by_month
        .into_iter()
        .rev()
        .take(MONTHLY_WINDOW)
        .map(|((year, month), pages)| MonthlyPages {
            month: format!("{:04}-{:02}", year, month),
            pages,
        })
        .collect();
    recent.reverse();
    recent
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn log(date: &str, pages: i32) -> ReadingLog {
        ReadingLog {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            date: day(date),
            pages_read: pages,
        }
    }

    fn book(total: i32, current: i32) -> Book {
        let mut b = Book::new("Book", "Author", total, None, None).unwrap();
        b.current_page = current;
        b
    }

    fn recording(duration: i64) -> Recording {
        Recording {
            id: Uuid::new_v4(),
            book_id: None,
            sentence_id: None,
            title: "Narration".into(),
            file_uri: "file:///narration.m4a".into(),
            duration_seconds: duration,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_all_zero_stats() {
        let stats = StatsAggregator::recompute(&[], &[], &[], day("2024-06-03"));
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn counts_books_and_completions() {
        let books = vec![book(300, 300), book(200, 50), book(0, 42)];
        let stats = StatsAggregator::recompute(&books, &[], &[], day("2024-06-03"));
        assert_eq!(stats.total_books, 3);
        // A book with an unknown page count is never counted as completed.
        assert_eq!(stats.completed_books, 1);
    }

    #[test]
    fn sums_pages_for_the_current_calendar_month_only() {
        let logs = vec![log("2024-05-02", 10), log("2024-05-20", 20), log("2024-04-28", 5)];
        let stats = StatsAggregator::recompute(&[], &logs, &[], day("2024-05-21"));
        assert_eq!(stats.total_pages_this_month, 30);
    }

    #[test]
    fn sums_recording_durations() {
        let recordings = vec![recording(90), recording(45)];
        let stats = StatsAggregator::recompute(&[], &[], &recordings, day("2024-06-03"));
        assert_eq!(stats.total_recording_duration, 135);
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let logs = vec![log("2024-06-01", 5), log("2024-06-02", 7), log("2024-06-03", 3)];
        assert_eq!(streak_days(&logs, day("2024-06-03")), 3);
    }

    #[test]
    fn gap_breaks_the_streak_even_with_older_activity() {
        let logs = vec![log("2024-06-01", 5), log("2024-06-03", 3)];
        assert_eq!(streak_days(&logs, day("2024-06-03")), 1);
    }

    #[test]
    fn yesterday_anchors_the_streak_until_end_of_today() {
        let logs = vec![log("2024-06-01", 5), log("2024-06-02", 7)];
        assert_eq!(streak_days(&logs, day("2024-06-03")), 2);

        let single = vec![log("2024-06-02", 7)];
        assert_eq!(streak_days(&single, day("2024-06-03")), 1);
    }

    #[test]
    fn streak_is_zero_when_the_last_log_is_two_days_old() {
        let logs = vec![log("2024-06-01", 5)];
        assert_eq!(streak_days(&logs, day("2024-06-03")), 0);
    }

    #[test]
    fn multiple_books_on_one_day_count_as_a_single_streak_day() {
        let logs = vec![log("2024-06-03", 5), log("2024-06-03", 9), log("2024-06-02", 1)];
        assert_eq!(streak_days(&logs, day("2024-06-03")), 2);
    }

    #[test]
    fn zero_page_entries_do_not_extend_the_streak() {
        let logs = vec![log("2024-06-03", 0), log("2024-06-02", 4)];
        assert_eq!(streak_days(&logs, day("2024-06-03")), 1);
    }

    #[test]
    fn monthly_pages_groups_and_sorts_ascending() {
        let logs = vec![log("2024-05-02", 10), log("2024-05-20", 20), log("2024-04-28", 5)];
        let months = monthly_pages(&logs);
        assert_eq!(
            months,
            vec![
                MonthlyPages { month: "2024-04".into(), pages: 5 },
                MonthlyPages { month: "2024-05".into(), pages: 30 },
            ]
        );
    }

    #[test]
    fn monthly_pages_keeps_only_the_six_most_recent_months() {
        let logs: Vec<ReadingLog> = (1..=8)
            .map(|m| log(&format!("2024-{:02}-15", m), m))
            .collect();
        let months = monthly_pages(&logs);
        assert_eq!(months.len(), 6);
        assert_eq!(months.first().unwrap().month, "2024-03");
        assert_eq!(months.last().unwrap().month, "2024-08");
    }
}
