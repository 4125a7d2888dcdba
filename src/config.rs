use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::TestSettings;

pub trait SettingsStore {
    fn load(&self) -> TestSettings;
    fn save(&self, settings: &TestSettings) -> std::io::Result<()>;
}

/// JSON file under the platform config dir. Unreadable or malformed files
/// fall back to defaults; loaded values are snapped onto the supported steps
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "heliotype") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("heliotype_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> TestSettings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(mut settings) = serde_json::from_slice::<TestSettings>(&bytes) {
                settings.sanitize();
                return settings;
            }
        }
        TestSettings::default()
    }

    fn save(&self, settings: &TestSettings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Mode;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("settings.json"));
        let settings = TestSettings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn roundtrip_custom_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("settings.json"));
        let settings = TestSettings {
            mode: Mode::Words,
            duration: 60,
            word_count: 50,
            punctuation: true,
            numbers: true,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), TestSettings::default());
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"not json").unwrap();
        let store = FileSettingsStore::with_path(&path);
        assert_eq!(store.load(), TestSettings::default());
    }

    #[test]
    fn out_of_range_values_are_sanitized_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            br#"{"mode":"time","duration":7,"word_count":3,"punctuation":false,"numbers":false}"#,
        )
        .unwrap();
        let store = FileSettingsStore::with_path(&path);
        let settings = store.load();
        assert_eq!(settings.duration, 30);
        assert_eq!(settings.word_count, 25);
    }
}
