//! Export och import av all data som ett JSON-dokument

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::{checkin_repo, clear_data_tables, config_repo, habit_repo, mood_repo, Database};
use crate::models::{AppConfig, DailyMood, Habit, HabitRecord, UnifiedCheckIn, UnifiedCheckInConfig};
use crate::utils::AppError;

/// Nuvarande version av exportformatet
pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Hela appens tillstånd
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    pub format_version: u32,
    pub exported_at: String,
    pub config: Option<AppConfig>,
    #[serde(default)]
    pub moods: Vec<DailyMood>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub habit_records: Vec<HabitRecord>,
    #[serde(default)]
    pub check_in_configs: Vec<UnifiedCheckInConfig>,
    #[serde(default)]
    pub check_ins: Vec<UnifiedCheckIn>,
}

impl BackupData {
    /// Kontrollera att formatversionen går att importera
    pub fn validate(&self) -> Result<(), AppError> {
        if self.format_version == 0 || self.format_version > BACKUP_FORMAT_VERSION {
            return Err(AppError::unsupported_backup_version(
                self.format_version,
                BACKUP_FORMAT_VERSION,
            ));
        }
        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.moods.len()
            + self.habits.len()
            + self.habit_records.len()
            + self.check_in_configs.len()
            + self.check_ins.len()
    }
}

/// Resultat av en export till fil
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub path: PathBuf,
    pub record_count: usize,
    pub file_size: usize,
}

/// Resultat av en import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub config_restored: bool,
    pub moods: usize,
    pub habits: usize,
    pub habit_records: usize,
    pub check_in_configs: usize,
    pub check_ins: usize,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        format!(
            "{} humörposter, {} vanor ({} incheckningar), {} strömmar ({} incheckningar)",
            self.moods, self.habits, self.habit_records, self.check_in_configs, self.check_ins
        )
    }
}

/// Felmeddelande för visning, hela kedjan på en rad
pub fn describe_error(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}

/// Export-tjänst
pub struct ExportService<'a> {
    db: &'a Database,
}

impl<'a> ExportService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Generera filnamn för export
    pub fn generate_filename() -> String {
        format!("lovediary_export_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Samla all data i en ögonblicksbild
    pub fn collect(&self) -> Result<BackupData> {
        self.db.with_connection(|conn| {
            Ok(BackupData {
                format_version: BACKUP_FORMAT_VERSION,
                exported_at: Local::now().to_rfc3339(),
                config: config_repo::find_config(conn)?,
                moods: mood_repo::find_all_moods(conn)?,
                habits: habit_repo::find_all_habits(conn)?,
                habit_records: habit_repo::find_all_records(conn)?,
                check_in_configs: checkin_repo::find_all_configs(conn)?,
                check_ins: checkin_repo::find_all_check_ins(conn)?,
            })
        })
    }

    /// Exportera till JSON-sträng
    pub fn export_json(&self) -> Result<String> {
        let data = self.collect()?;
        serde_json::to_string_pretty(&data).context("JSON serialisering misslyckades")
    }

    /// Exportera till fil
    pub fn export_to_file(&self, path: &Path) -> Result<ExportResult> {
        let data = self.collect()?;
        let content =
            serde_json::to_string_pretty(&data).context("JSON serialisering misslyckades")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Kunde inte skapa exportkatalog")?;
        }
        std::fs::write(path, &content).context("Kunde inte skriva fil")?;

        info!("Exporterade {} poster till {:?}", data.record_count(), path);

        Ok(ExportResult {
            path: path.to_path_buf(),
            record_count: data.record_count(),
            file_size: content.len(),
        })
    }

    /// Importera från JSON-sträng (ersätter all befintlig data)
    pub fn import_json(&self, json: &str) -> Result<ImportResult> {
        let data: BackupData = serde_json::from_str(json).context("Ogiltigt exportformat")?;
        self.import_data(&data)
    }

    /// Importera från fil (ersätter all befintlig data)
    pub fn import_from_file(&self, path: &Path) -> Result<ImportResult> {
        let json = std::fs::read_to_string(path).context("Kunde inte läsa exportfil")?;
        self.import_json(&json)
    }

    /// Ersätt all data med innehållet i `data`.
    ///
    /// Allt sker i en transaktion: misslyckas något finns den gamla datan kvar.
    pub fn import_data(&self, data: &BackupData) -> Result<ImportResult> {
        data.validate()?;

        let result = self.db.with_transaction(|tx| {
            clear_data_tables(tx)?;

            if let Some(config) = &data.config {
                config_repo::save_config(tx, config)?;
            }
            for config in &data.check_in_configs {
                checkin_repo::insert_config_with_id(tx, config)?;
            }
            for habit in &data.habits {
                habit_repo::insert_habit_with_id(tx, habit)?;
            }
            for record in &data.habit_records {
                habit_repo::insert_record_with_id(tx, record)?;
            }
            for check_in in &data.check_ins {
                checkin_repo::insert_check_in_with_id(tx, check_in)?;
            }
            for mood in &data.moods {
                mood_repo::insert_mood_with_id(tx, mood)?;
            }

            Ok(ImportResult {
                config_restored: data.config.is_some(),
                moods: data.moods.len(),
                habits: data.habits.len(),
                habit_records: data.habit_records.len(),
                check_in_configs: data.check_in_configs.len(),
                check_ins: data.check_ins.len(),
            })
        })?;

        info!("Import klar: {}", result.summary());
        Ok(result)
    }
}
