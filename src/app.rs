//! Applikationskontext: inställningar, databas och tjänster

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info};

use crate::db::Database;
use crate::models::AppSettings;
use crate::services::{
    AttachmentService, BackupService, DashboardService, DashboardSummary, ExportService,
    RestoreService, StatisticsService,
};
use crate::utils::logging::init_logging;
use crate::utils::path::{attachments_dir, get_settings_path, DATABASE_FILENAME};

/// Allt som en frontend behöver för att prata med datan
pub struct LoveDiaryApp {
    db: Database,
    settings: AppSettings,
}

impl LoveDiaryApp {
    /// Starta med inställningar från standardplatsen
    pub fn start() -> Result<Self> {
        let settings = AppSettings::load();
        init_logging(&settings.log_level);
        info!("Inställningar: {:?}", get_settings_path());
        Self::with_settings(settings)
    }

    /// Öppna databasen i inställningarnas datakatalog och kör migrationer
    pub fn with_settings(settings: AppSettings) -> Result<Self> {
        let data_dir = settings.data_dir();
        let db_path = data_dir.join(DATABASE_FILENAME);
        info!("Öppnar databas: {:?}", db_path);

        let db = Database::open(&db_path)
            .with_context(|| format!("Kunde inte öppna databas {:?}", db_path))?;
        if let Err(e) = db.migrate() {
            error!("Migrering misslyckades: {:#}", e);
            return Err(e);
        }

        std::fs::create_dir_all(attachments_dir(&data_dir))
            .context("Kunde inte skapa bilagekatalog")?;

        Ok(Self { db, settings })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Spara ändrade inställningar till en fil
    pub fn update_settings(&mut self, settings: AppSettings, path: &Path) -> Result<()> {
        settings.save_to(path)?;
        self.settings = settings;
        Ok(())
    }

    pub fn is_setup_complete(&self) -> bool {
        self.db.config().is_setup_complete().unwrap_or(false)
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary> {
        DashboardService::new(&self.db)
            .with_lookback(self.settings.streak_lookback_days)
            .snapshot(today)
    }

    pub fn statistics(&self) -> StatisticsService<'_> {
        StatisticsService::new(&self.db)
    }

    pub fn export(&self) -> ExportService<'_> {
        ExportService::new(&self.db)
    }

    pub fn backups(&self) -> BackupService<'_> {
        BackupService::new(&self.db, &self.settings)
    }

    pub fn restore(&self) -> RestoreService<'_> {
        RestoreService::new(&self.db, &self.settings)
    }

    pub fn attachments(&self) -> AttachmentService<'_> {
        AttachmentService::new(&self.db, &self.settings)
    }
}
