//! Restore-service för att återställa från ett backup-arkiv

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use zip::ZipArchive;

use super::backup::{format_size, ATTACHMENTS_PREFIX, DATA_ENTRY};
use super::export::{BackupData, ExportService, ImportResult};
use crate::db::Database;
use crate::models::AppSettings;
use crate::utils::path::attachments_dir;
use crate::utils::AppError;

/// Resultat av en restore-operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    pub import: ImportResult,
    pub attachments_restored: usize,
}

/// Förhandsgranskning av restore
#[derive(Debug, Clone)]
pub struct RestorePreview {
    pub has_data: bool,
    pub exported_at: Option<String>,
    pub record_count: usize,
    pub attachment_count: usize,
    /// Total storlek (okomprimerad)
    pub total_size: u64,
}

impl RestorePreview {
    pub fn size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Restore-service
pub struct RestoreService<'a> {
    db: &'a Database,
    attachments_dir: PathBuf,
}

impl<'a> RestoreService<'a> {
    pub fn new(db: &'a Database, settings: &AppSettings) -> Self {
        Self {
            db,
            attachments_dir: attachments_dir(&settings.data_dir()),
        }
    }

    /// Förhandsgranska en backup
    pub fn preview(&self, backup_path: &Path) -> Result<RestorePreview> {
        let mut archive = open_archive(backup_path)?;

        let mut attachment_count = 0;
        let mut total_size = 0u64;

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.name().starts_with(ATTACHMENTS_PREFIX) && file.is_file() {
                attachment_count += 1;
            }
            total_size += file.size();
        }

        let data = read_data(&mut archive).ok();

        Ok(RestorePreview {
            has_data: data.is_some(),
            exported_at: data.as_ref().map(|d| d.exported_at.clone()),
            record_count: data.as_ref().map_or(0, |d| d.record_count()),
            attachment_count,
            total_size,
        })
    }

    /// Återställ från backup. All befintlig data ersätts.
    ///
    /// Bilagorna packas upp i en mellankatalog och flyttas in först när
    /// importen har lyckats. Ett avvisat arkiv lämnar både databasen och
    /// bilagekatalogen orörda.
    pub fn restore(&self, backup_path: &Path) -> Result<RestoreResult> {
        let mut archive = open_archive(backup_path)?;

        let mut data = read_data(&mut archive)?;
        data.validate()?;

        let staging = self.staging_dir();
        if staging.exists() {
            fs::remove_dir_all(&staging).context("Kunde inte rensa gammal mellankatalog")?;
        }

        let outcome = self.stage_and_import(&mut archive, &mut data, &staging);

        if staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!("Kunde inte ta bort mellankatalog {:?}: {}", staging, e);
            }
        }

        let (import, attachments_restored) = outcome?;

        info!(
            "Återställde {} från {:?} ({} bilagor)",
            import.summary(),
            backup_path,
            attachments_restored
        );

        Ok(RestoreResult {
            import,
            attachments_restored,
        })
    }

    /// Validera en backup-fil
    pub fn validate(&self, backup_path: &Path) -> Result<bool> {
        let file = File::open(backup_path)?;
        let mut archive = match ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(_) => return Ok(false),
        };

        match read_data(&mut archive) {
            Ok(data) if data.validate().is_ok() => {}
            _ => return Ok(false),
        }

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut buffer = Vec::new();
            if file.read_to_end(&mut buffer).is_err() {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn staging_dir(&self) -> PathBuf {
        self.attachments_dir.with_file_name(".attachments_restore")
    }

    fn stage_and_import(
        &self,
        archive: &mut ZipArchive<File>,
        data: &mut BackupData,
        staging: &Path,
    ) -> Result<(ImportResult, usize)> {
        let staged = extract_attachments(archive, staging)?;

        let targets: HashMap<String, PathBuf> = staged
            .iter()
            .filter_map(|relative| {
                let name = relative.file_name()?.to_string_lossy().to_string();
                Some((name, self.attachments_dir.join(relative)))
            })
            .collect();
        rewrite_image_paths(data, &targets);

        let import = ExportService::new(self.db).import_data(data)?;

        // Databasen är ersatt, nu kan bilagorna flyttas på plats
        for relative in &staged {
            move_into_place(&staging.join(relative), &self.attachments_dir.join(relative))?;
        }

        Ok((import, staged.len()))
    }
}

/// Packa upp bilagor under `staging`. Returnerar relativa sökvägar.
fn extract_attachments(archive: &mut ZipArchive<File>, staging: &Path) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if !file.name().starts_with(ATTACHMENTS_PREFIX) || !file.is_file() {
            continue;
        }

        // enclosed_name skyddar mot sökvägar som "../"
        let Some(enclosed) = file.enclosed_name() else {
            continue;
        };
        let Ok(relative) = enclosed.strip_prefix(ATTACHMENTS_PREFIX.trim_end_matches('/')) else {
            continue;
        };

        let target = staging.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&target)
            .with_context(|| format!("Kunde inte skriva bilaga {:?}", target))?;
        io::copy(&mut file, &mut outfile)?;

        staged.push(relative.to_path_buf());
    }

    Ok(staged)
}

/// Flytta en fil och ersätt en befintlig
fn move_into_place(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    if dest.exists() {
        fs::remove_file(dest).with_context(|| format!("Kunde inte ersätta {:?}", dest))?;
    }

    // rename misslyckas mellan filsystem, kopiera då i stället
    if fs::rename(source, dest).is_err() {
        fs::copy(source, dest)
            .with_context(|| format!("Kunde inte flytta {:?} till {:?}", source, dest))?;
    }
    Ok(())
}

fn open_archive(backup_path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(backup_path).context("Kunde inte öppna backup-fil")?;
    ZipArchive::new(file).context("Kunde inte läsa ZIP-arkiv")
}

fn read_data(archive: &mut ZipArchive<File>) -> Result<BackupData> {
    let mut entry = archive
        .by_name(DATA_ENTRY)
        .map_err(|_| AppError::missing_archive_entry(DATA_ENTRY))?;

    let mut json = String::new();
    entry.read_to_string(&mut json)?;
    serde_json::from_str(&json).context("Ogiltig data.json i arkivet")
}

/// Peka om bildreferenser till de uppackade bilagorna
fn rewrite_image_paths(data: &mut BackupData, restored: &HashMap<String, PathBuf>) {
    let relocate = |image_path: &mut Option<String>| {
        let Some(current) = image_path.as_deref() else {
            return;
        };
        let name = current.rsplit(['/', '\\']).next().unwrap_or(current);
        if let Some(target) = restored.get(name) {
            *image_path = Some(target.to_string_lossy().to_string());
        }
    };

    for mood in &mut data.moods {
        relocate(&mut mood.image_path);
    }
    for check_in in &mut data.check_ins {
        relocate(&mut check_in.image_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyMood, Habit, MoodType};
    use crate::services::backup::BackupService;
    use chrono::NaiveDate;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn settings_for(dir: &Path) -> AppSettings {
        AppSettings {
            data_directory: Some(dir.to_path_buf()),
            backup_retention: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_backup_and_restore_to_new_location() {
        let source_dir = tempfile::tempdir().unwrap();
        let source_settings = settings_for(source_dir.path());
        let source = Database::open_in_memory().unwrap();

        let source_attachments = attachments_dir(source_dir.path());
        fs::create_dir_all(&source_attachments).unwrap();
        let photo = source_attachments.join("kiss.png");
        fs::write(&photo, b"png-data").unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut mood = DailyMood::new(date, MoodType::Loved);
        mood.image_path = Some(photo.to_string_lossy().to_string());
        source.moods().save(&mut mood).unwrap();
        let mut habit = Habit::new("晚安吻");
        let habit_id = source.habits().create(&mut habit).unwrap();
        source.habits().check_in(habit_id, date, None).unwrap();

        let backup = BackupService::new(&source, &source_settings).create_backup().unwrap();

        let target_dir = tempfile::tempdir().unwrap();
        let target_settings = settings_for(target_dir.path());
        let target = Database::open_in_memory().unwrap();
        let service = RestoreService::new(&target, &target_settings);

        let preview = service.preview(&backup.path).unwrap();
        assert!(preview.has_data);
        assert_eq!(preview.attachment_count, 1);
        assert_eq!(preview.record_count, backup.record_count);
        assert!(service.validate(&backup.path).unwrap());

        let result = service.restore(&backup.path).unwrap();
        assert_eq!(result.attachments_restored, 1);
        assert_eq!(result.import.moods, 1);
        assert_eq!(result.import.habit_records, 1);

        let restored_photo = attachments_dir(target_dir.path()).join("kiss.png");
        assert_eq!(fs::read(&restored_photo).unwrap(), b"png-data");

        let restored_mood = target.moods().find_by_date(date).unwrap().unwrap();
        assert_eq!(
            restored_mood.image_path,
            Some(restored_photo.to_string_lossy().to_string())
        );
    }

    #[test]
    fn test_archive_without_data_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        {
            let mut zip = ZipWriter::new(File::create(&path).unwrap());
            zip.start_file("attachments/a.jpg", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"x").unwrap();
            zip.finish().unwrap();
        }

        let db = Database::open_in_memory().unwrap();
        db.moods()
            .save(&mut DailyMood::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), MoodType::Calm))
            .unwrap();
        let service = RestoreService::new(&db, &settings_for(dir.path()));

        assert!(!service.validate(&path).unwrap());
        assert!(!service.preview(&path).unwrap().has_data);
        assert!(service.restore(&path).is_err());

        // Inget har rörts
        assert_eq!(db.moods().count().unwrap(), 1);
        assert!(!attachments_dir(dir.path()).join("a.jpg").exists());
    }

    fn write_archive(path: &Path, data: &BackupData, attachments: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file(DATA_ENTRY, SimpleFileOptions::default()).unwrap();
        zip.write_all(&serde_json::to_vec(data).unwrap()).unwrap();
        for (name, content) in attachments {
            zip.start_file(format!("{}{}", ATTACHMENTS_PREFIX, name), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn seeded_db_with_picture(dir: &Path) -> Database {
        let db = Database::open_in_memory().unwrap();
        let mut habit = Habit::new("拥抱");
        let id = db.habits().create(&mut habit).unwrap();
        db.habits()
            .check_in(id, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), None)
            .unwrap();

        let attachments = attachments_dir(dir);
        fs::create_dir_all(&attachments).unwrap();
        fs::write(attachments.join("pic.jpg"), b"ORIGINAL").unwrap();
        db
    }

    #[test]
    fn test_unsupported_version_leaves_attachments_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db_with_picture(dir.path());
        let service = RestoreService::new(&db, &settings_for(dir.path()));

        let mut data = ExportService::new(&db).collect().unwrap();
        data.format_version = 99;
        let path = dir.path().join("future.zip");
        write_archive(&path, &data, &[("pic.jpg", b"FROM_BAD_BACKUP")]);

        assert!(!service.validate(&path).unwrap());
        let err = service.restore(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::UnsupportedFormat(_))
        ));

        let picture = attachments_dir(dir.path()).join("pic.jpg");
        assert_eq!(fs::read(&picture).unwrap(), b"ORIGINAL");
        assert_eq!(db.habits().find_active().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_import_leaves_attachments_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db_with_picture(dir.path());
        let service = RestoreService::new(&db, &settings_for(dir.path()));

        // Rätt version men en post som pekar på en vana som inte finns
        let mut data = ExportService::new(&db).collect().unwrap();
        data.habit_records[0].habit_id = 4242;
        let path = dir.path().join("broken_records.zip");
        write_archive(
            &path,
            &data,
            &[("pic.jpg", b"FROM_BAD_BACKUP"), ("2026/new.jpg", b"NEW")],
        );

        assert!(service.restore(&path).is_err());

        let attachments = attachments_dir(dir.path());
        assert_eq!(fs::read(attachments.join("pic.jpg")).unwrap(), b"ORIGINAL");
        assert!(!attachments.join("2026").join("new.jpg").exists());
        assert!(!service.staging_dir().exists());
        assert_eq!(db.habits().records_for(1).unwrap().len(), 1);

        // Samma arkiv med giltiga poster ersätter bilden
        data.habit_records[0].habit_id = 1;
        write_archive(&path, &data, &[("pic.jpg", b"FROM_GOOD_BACKUP")]);
        let result = service.restore(&path).unwrap();
        assert_eq!(result.attachments_restored, 1);
        assert_eq!(fs::read(attachments.join("pic.jpg")).unwrap(), b"FROM_GOOD_BACKUP");
        assert!(!service.staging_dir().exists());
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.zip");
        fs::write(&path, b"not a zip").unwrap();

        let db = Database::open_in_memory().unwrap();
        let service = RestoreService::new(&db, &settings_for(dir.path()));
        assert!(!service.validate(&path).unwrap());
        assert!(service.restore(&path).is_err());
    }
}
