use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::utils::date::LONG_STREAK_LOOKBACK_DAYS;
use crate::utils::path::{backups_dir, get_data_dir, get_settings_path};

/// Mörkt/ljust läge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DarkMode {
    /// Följ systemet
    #[default]
    System,
    Light,
    Dark,
}

impl DarkMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "跟随系统",
            Self::Light => "浅色",
            Self::Dark => "深色",
        }
    }

    pub fn all() -> &'static [DarkMode] {
        &[Self::System, Self::Light, Self::Dark]
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "light" => Self::Light,
            "dark" => Self::Dark,
            _ => Self::System,
        }
    }
}

impl fmt::Display for DarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Appkonfiguration (singleton, id=1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub id: i64,
    /// Datum då relationen startade
    pub start_date: Option<NaiveDate>,
    pub my_name: String,
    pub partner_name: String,
    pub show_day_counter: bool,
    pub show_mood_streak: bool,
    pub show_anniversary_banner: bool,
    pub reminder_enabled: bool,
    pub reminder_time: Option<NaiveTime>,
    pub dark_mode: DarkMode,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            id: 1,
            start_date: None,
            my_name: String::new(),
            partner_name: String::new(),
            show_day_counter: true,
            show_mood_streak: true,
            show_anniversary_banner: true,
            reminder_enabled: false,
            reminder_time: None,
            dark_mode: DarkMode::default(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl AppConfig {
    /// Parets namn för visning, t.ex. "小明 ♥ 小红"
    pub fn couple_display_name(&self) -> String {
        let me = self.my_name.trim();
        let partner = self.partner_name.trim();
        match (me.is_empty(), partner.is_empty()) {
            (false, false) => format!("{} ♥ {}", me, partner),
            (false, true) => me.to_string(),
            (true, false) => partner.to_string(),
            (true, true) => String::new(),
        }
    }

    pub fn is_setup_complete(&self) -> bool {
        self.start_date.is_some()
    }
}

/// Lokala inställningar som inte sparas i databasen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Överskrid standardkatalogen för data
    pub data_directory: Option<PathBuf>,
    /// Överskrid standardkatalogen för backuper
    pub backup_directory: Option<PathBuf>,
    pub log_level: String,
    /// Bakåtblick i dagar för streak på dashboard
    pub streak_lookback_days: u32,
    /// Antal backuper att behålla (0 = alla)
    pub backup_retention: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_directory: None,
            backup_directory: None,
            log_level: "info".to_string(),
            streak_lookback_days: crate::utils::date::STREAK_LOOKBACK_DAYS,
            backup_retention: 10,
        }
    }
}

impl AppSettings {
    /// Ladda från standardplatsen, annars defaults
    pub fn load() -> Self {
        Self::load_from(&get_settings_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(mut settings) => {
                    settings.streak_lookback_days = settings
                        .streak_lookback_days
                        .clamp(1, LONG_STREAK_LOOKBACK_DAYS);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Ogiltig inställningsfil {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&get_settings_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_directory.clone().unwrap_or_else(get_data_dir)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.backup_directory
            .clone()
            .unwrap_or_else(|| backups_dir(&self.data_dir()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_mode_db_roundtrip() {
        for mode in DarkMode::all() {
            assert_eq!(DarkMode::from_db_str(&mode.to_string()), *mode);
        }
        assert_eq!(DarkMode::from_db_str("okänd"), DarkMode::System);
    }

    #[test]
    fn test_couple_display_name() {
        let mut config = AppConfig::default();
        assert_eq!(config.couple_display_name(), "");

        config.my_name = "小明".into();
        assert_eq!(config.couple_display_name(), "小明");

        config.partner_name = "小红".into();
        assert_eq!(config.couple_display_name(), "小明 ♥ 小红");
    }

    #[test]
    fn test_settings_toml_roundtrip() {
        let settings = AppSettings {
            data_directory: Some(PathBuf::from("/data/lovediary")),
            log_level: "debug".into(),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let loaded: AppSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.backup_dir(), PathBuf::from("/data/lovediary/backups"));
    }

    #[test]
    fn test_settings_backwards_compat() {
        // Gammal fil utan nyare fält ska ge defaults för dem
        let old_toml = r#"
log_level = "warn"
"#;
        let loaded: AppSettings = toml::from_str(old_toml).unwrap();
        assert_eq!(loaded.log_level, "warn");
        assert_eq!(loaded.streak_lookback_days, 30);
        assert_eq!(loaded.backup_retention, 10);
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        // Saknad fil -> defaults
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());

        let settings = AppSettings {
            backup_retention: 3,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).backup_retention, 3);
    }

    #[test]
    fn test_settings_lookback_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        std::fs::write(&path, "streak_lookback_days = 4294967295\n").unwrap();
        assert_eq!(
            AppSettings::load_from(&path).streak_lookback_days,
            LONG_STREAK_LOOKBACK_DAYS
        );

        std::fs::write(&path, "streak_lookback_days = 0\n").unwrap();
        assert_eq!(AppSettings::load_from(&path).streak_lookback_days, 1);
    }
}
