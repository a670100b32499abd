use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Filnamn för databasen
pub const DATABASE_FILENAME: &str = "lovediary.db";

/// Filnamn för lokala inställningar
pub const SETTINGS_FILENAME: &str = "settings.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "lovediary", "LoveDiary")
}

/// Hämta standardkatalog för data
pub fn get_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Hämta sökväg till inställningsfilen
pub fn get_settings_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILENAME))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME))
}

/// Katalog för bilagor (humörbilder m.m.) under en datakatalog
pub fn attachments_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("attachments")
}

/// Katalog för backuper under en datakatalog
pub fn backups_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("backups")
}

/// Normalisera sökväg för visning
pub fn display_path(path: &Path) -> String {
    // Förkorta hemkatalogen till ~
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Skapa en säker filnamn från en sträng
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Hämta filändelse
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Kontrollera om en fil är en bild
pub fn is_image_file(path: &Path) -> bool {
    matches!(
        get_extension(path).as_deref(),
        Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "heic")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("hello world"), "hello world");
        assert_eq!(sanitize_filename("hello/world"), "hello_world");
        assert_eq!(sanitize_filename("mood:2024"), "mood_2024");
        assert_eq!(sanitize_filename("..\\x"), ".._x");
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.jpg")));
        assert!(is_image_file(Path::new("image.PNG")));
        assert!(!is_image_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_data_subdirectories() {
        let base = Path::new("/tmp/lovediary");
        assert_eq!(attachments_dir(base), base.join("attachments"));
        assert_eq!(backups_dir(base), base.join("backups"));
    }
}
