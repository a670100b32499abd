//! Bilder kopplade till humörposter, lagrade i datakatalogens attachments/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{AppSettings, DailyMood};
use crate::utils::path::{attachments_dir, get_extension, is_image_file, sanitize_filename};
use crate::utils::AppError;

pub struct AttachmentService<'a> {
    db: &'a Database,
    dir: PathBuf,
}

impl<'a> AttachmentService<'a> {
    pub fn new(db: &'a Database, settings: &AppSettings) -> Self {
        Self {
            db,
            dir: attachments_dir(&settings.data_dir()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Kopiera en bild till bilagekatalogen. Namnet prefixas med datumet
    /// och får ett löpnummer om det redan finns.
    pub fn store_image(&self, source: &Path, date: NaiveDate) -> Result<PathBuf> {
        if !is_image_file(source) {
            return Err(AppError::validation(format!("{:?} är ingen bild", source)).into());
        }

        let stem = source
            .file_stem()
            .map(|s| sanitize_filename(&s.to_string_lossy()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "bild".to_string());
        let ext = get_extension(source).unwrap_or_default();
        let base = format!("{}_{}", date.format("%Y%m%d"), stem);

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Kunde inte skapa katalog: {:?}", self.dir))?;

        let mut target = self.dir.join(format!("{}.{}", base, ext));
        let mut n = 1;
        while target.exists() {
            target = self.dir.join(format!("{}_{}.{}", base, n, ext));
            n += 1;
        }

        fs::copy(source, &target)
            .with_context(|| format!("Kunde inte kopiera {:?} till {:?}", source, target))?;

        Ok(target)
    }

    /// Koppla en bild till dagens humörpost. Tidigare bild tas bort först
    /// när posten har sparats med den nya.
    pub fn attach_to_mood(&self, date: NaiveDate, source: &Path) -> Result<DailyMood> {
        let mut mood = self
            .db
            .moods()
            .find_by_date(date)?
            .ok_or_else(|| AppError::mood_not_found(date))?;

        let stored = self.store_image(source, date)?;
        let previous = mood
            .image_path
            .replace(stored.to_string_lossy().to_string());

        if let Err(e) = self.db.moods().save(&mut mood) {
            if let Err(cleanup) = fs::remove_file(&stored) {
                warn!("Kunde inte ta bort {:?}: {}", stored, cleanup);
            }
            return Err(e);
        }

        if let Some(old) = previous {
            if let Err(e) = self.remove(Path::new(&old)) {
                warn!("Gammal bild {} kunde inte tas bort: {}", old, e);
            }
        }

        info!("Bild kopplad till {}: {:?}", date, stored);
        Ok(mood)
    }

    /// Ta bort en bilaga. Filer utanför bilagekatalogen lämnas orörda.
    pub fn remove(&self, path: &Path) -> Result<bool> {
        if !path.starts_with(&self.dir) || !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("Kunde inte ta bort fil: {:?}", path))?;
        Ok(true)
    }
}
