pub mod backup;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod stats;

pub use backup::{BackupData, BackupLogEntry};
pub use domain::{Book, MonthlyPages, ReadingLog, Recording, Sentence, Stats};
pub use ports::{
    BookRepository, PortError, PortResult, ReadingLogRepository, RecordingRepository,
    SentenceRepository,
};
pub use progress::ProgressTracker;
pub use stats::StatsAggregator;
