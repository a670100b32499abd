//! Backup-service: ZIP-arkiv med data.json och bilagor

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::export::ExportService;
use crate::db::Database;
use crate::models::AppSettings;
use crate::utils::path::{attachments_dir, display_path};

/// Namn på datafilen i arkivet
pub const DATA_ENTRY: &str = "data.json";

/// Prefix för bilagor i arkivet
pub const ATTACHMENTS_PREFIX: &str = "attachments/";

const BACKUP_PREFIX: &str = "lovediary_backup_";

/// Formatera storlek för visning
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

/// Resultat av en backup-operation
#[derive(Debug, Clone)]
pub struct BackupResult {
    /// Sökväg till backup-filen
    pub path: PathBuf,
    /// Storlek i bytes
    pub size: u64,
    /// Antal bilagor inkluderade
    pub attachment_count: usize,
    /// Antal dataposter
    pub record_count: usize,
    pub created_at: String,
}

impl BackupResult {
    pub fn size_display(&self) -> String {
        format_size(self.size)
    }
}

/// Information om en befintlig backup
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
    /// Datum (extraherat från filnamn)
    pub date: Option<String>,
}

impl BackupInfo {
    pub fn size_display(&self) -> String {
        format_size(self.size)
    }
}

/// Backup-service
pub struct BackupService<'a> {
    db: &'a Database,
    backup_dir: PathBuf,
    attachments_dir: PathBuf,
    retention: usize,
}

impl<'a> BackupService<'a> {
    pub fn new(db: &'a Database, settings: &AppSettings) -> Self {
        Self {
            db,
            backup_dir: settings.backup_dir(),
            attachments_dir: attachments_dir(&settings.data_dir()),
            retention: settings.backup_retention,
        }
    }

    /// Skapa en backup i backupkatalogen
    pub fn create_backup(&self) -> Result<BackupResult> {
        fs::create_dir_all(&self.backup_dir).context("Kunde inte skapa backup-katalog")?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}{}.zip", BACKUP_PREFIX, timestamp);
        let result = self.create_backup_at(&self.backup_dir.join(filename))?;

        if self.retention > 0 {
            self.prune_old_backups(self.retention)?;
        }

        Ok(result)
    }

    /// Skapa en backup på en valfri sökväg
    pub fn create_backup_at(&self, backup_path: &Path) -> Result<BackupResult> {
        let data = ExportService::new(self.db).collect()?;
        let json = serde_json::to_vec_pretty(&data).context("JSON serialisering misslyckades")?;

        let file = File::create(backup_path).context("Kunde inte skapa backup-fil")?;
        let mut zip = ZipWriter::new(file);

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(6));

        zip.start_file(DATA_ENTRY, options)?;
        zip.write_all(&json)?;

        let attachment_count = if self.attachments_dir.exists() {
            self.add_attachments(&mut zip, options)?
        } else {
            0
        };

        zip.finish().context("Kunde inte avsluta ZIP-fil")?;

        let metadata = fs::metadata(backup_path)?;
        info!(
            "Backup skapad: {} ({}, {} bilagor)",
            display_path(backup_path),
            format_size(metadata.len()),
            attachment_count
        );

        Ok(BackupResult {
            path: backup_path.to_path_buf(),
            size: metadata.len(),
            attachment_count,
            record_count: data.record_count(),
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// Lista befintliga backuper, nyast först
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "zip").unwrap_or(false) {
                let filename = path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();

                let metadata = fs::metadata(&path)?;
                let date = Self::extract_date_from_filename(&filename);

                backups.push(BackupInfo {
                    path,
                    filename,
                    size: metadata.len(),
                    date,
                });
            }
        }

        backups.sort_by(|a, b| b.filename.cmp(&a.filename));

        Ok(backups)
    }

    /// Ta bort en backup
    pub fn delete_backup(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).context("Kunde inte ta bort backup-fil")?;
        Ok(())
    }

    /// Behåll de `keep` senaste backuperna, ta bort resten
    pub fn prune_old_backups(&self, keep: usize) -> Result<usize> {
        let backups = self.list_backups()?;
        let mut removed = 0;

        for old in backups
            .iter()
            .filter(|b| b.filename.starts_with(BACKUP_PREFIX))
            .skip(keep)
        {
            match self.delete_backup(&old.path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Kunde inte rensa {}: {:#}", old.filename, e),
            }
        }

        if removed > 0 {
            info!("Rensade {} gamla backuper", removed);
        }
        Ok(removed)
    }

    fn add_attachments<W: Write + std::io::Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<usize> {
        let mut count = 0;

        for entry in WalkDir::new(&self.attachments_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.attachments_dir).unwrap_or(path);
            let archive_name = format!(
                "{}{}",
                ATTACHMENTS_PREFIX,
                relative.to_string_lossy().replace('\\', "/")
            );

            zip.start_file(archive_name, options)?;
            let mut buffer = Vec::new();
            File::open(path)?.read_to_end(&mut buffer)?;
            zip.write_all(&buffer)?;
            count += 1;
        }

        Ok(count)
    }

    fn extract_date_from_filename(filename: &str) -> Option<String> {
        // Format: lovediary_backup_YYYYMMDD_HHMMSS.zip
        let date_part = filename
            .strip_prefix(BACKUP_PREFIX)?
            .strip_suffix(".zip")?;

        if date_part.len() < 15 || !date_part.is_char_boundary(15) {
            return None;
        }

        Some(format!(
            "{}-{}-{} {}:{}:{}",
            &date_part[0..4],
            &date_part[4..6],
            &date_part[6..8],
            &date_part[9..11],
            &date_part[11..13],
            &date_part[13..15]
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyMood, MoodType};
    use chrono::NaiveDate;
    use zip::ZipArchive;

    fn settings_for(dir: &Path) -> AppSettings {
        AppSettings {
            data_directory: Some(dir.to_path_buf()),
            backup_retention: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_date_from_filename() {
        let date = BackupService::extract_date_from_filename("lovediary_backup_20261016_143022.zip");
        assert_eq!(date, Some("2026-10-16 14:30:22".to_string()));

        assert_eq!(BackupService::extract_date_from_filename("other_file.zip"), None);
        assert_eq!(BackupService::extract_date_from_filename("lovediary_backup_2026.zip"), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_create_backup_contains_data_and_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(dir.path());
        let db = Database::open_in_memory().unwrap();

        let attachments = attachments_dir(dir.path());
        fs::create_dir_all(attachments.join("2026")).unwrap();
        fs::write(attachments.join("2026").join("photo.jpg"), b"jpeg").unwrap();

        let mut mood = DailyMood::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), MoodType::Happy);
        mood.image_path = Some(attachments.join("2026").join("photo.jpg").to_string_lossy().to_string());
        db.moods().save(&mut mood).unwrap();

        let service = BackupService::new(&db, &settings);
        let result = service.create_backup().unwrap();
        assert_eq!(result.attachment_count, 1);
        assert_eq!(result.record_count, 1);
        assert!(result.path.exists());

        let mut archive = ZipArchive::new(File::open(&result.path).unwrap()).unwrap();
        assert!(archive.by_name(DATA_ENTRY).is_ok());
        assert!(archive.by_name("attachments/2026/photo.jpg").is_ok());

        let backups = service.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].date.is_some());
    }

    #[test]
    fn test_prune_old_backups() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(dir.path());
        let db = Database::open_in_memory().unwrap();
        let service = BackupService::new(&db, &settings);

        let backup_dir = settings.backup_dir();
        fs::create_dir_all(&backup_dir).unwrap();
        for stamp in ["20261001_100000", "20261002_100000", "20261003_100000"] {
            service
                .create_backup_at(&backup_dir.join(format!("lovediary_backup_{}.zip", stamp)))
                .unwrap();
        }

        assert_eq!(service.prune_old_backups(2).unwrap(), 1);

        let remaining: Vec<String> = service
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.filename)
            .collect();
        assert_eq!(
            remaining,
            vec![
                "lovediary_backup_20261003_100000.zip".to_string(),
                "lovediary_backup_20261002_100000.zip".to_string(),
            ]
        );
    }
}
