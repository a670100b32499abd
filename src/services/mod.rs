//! Tjänster för LoveDiary
//!
//! Logik som spänner över flera repositories: översikt, statistik,
//! export och backup.

pub mod attachments;
pub mod backup;
pub mod dashboard;
pub mod export;
pub mod restore;
pub mod statistics;

pub use attachments::AttachmentService;
pub use backup::{BackupInfo, BackupResult, BackupService};
pub use dashboard::{CountdownSummary, DashboardService, DashboardSummary, DayCounter, HabitSummary};
pub use export::{BackupData, ExportResult, ExportService, ImportResult};
pub use restore::{RestorePreview, RestoreResult, RestoreService};
pub use statistics::{HabitStats, MoodDistribution, MoodShare, OverallStats, StatisticsService};
