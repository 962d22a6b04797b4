use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a learning-path store.
///
/// Loaded from `config.toml` in the store root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The key the serialized collection is stored under.
    storage_key: String,

    /// Whether the sample learning paths are written on first use.
    ///
    /// When `false`, first use writes an empty collection instead.
    pub seed_sample_data: bool,

    /// Cover image given to newly authored paths that don't set one.
    default_cover_image: String,

    /// Rating given to newly authored paths.
    initial_rating: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            seed_sample_data: true,
            default_cover_image: default_cover_image(),
            initial_rating: default_initial_rating(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads `config.toml` from `root`, falling back to the defaults if it is
    /// missing or invalid.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        let path = root.join("config.toml");
        Self::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The key the serialized collection is stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Cover image given to newly authored paths that don't set one.
    #[must_use]
    pub fn default_cover_image(&self) -> &str {
        &self.default_cover_image
    }

    /// Rating given to newly authored paths.
    #[must_use]
    pub const fn initial_rating(&self) -> f64 {
        self.initial_rating
    }

    /// Use a different storage key.
    pub fn set_storage_key(&mut self, key: impl Into<String>) {
        self.storage_key = key.into();
    }
}

fn default_storage_key() -> String {
    "repository-learning-paths".to_string()
}

fn default_cover_image() -> String {
    "https://images.unsplash.com/photo-1517694712202-14dd9538aa97".to_string()
}

const fn default_initial_rating() -> f64 {
    4.8
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_storage_key")]
        storage_key: String,

        #[serde(default = "default_true")]
        seed_sample_data: bool,

        #[serde(default = "default_cover_image")]
        default_cover_image: String,

        /// Rating given to newly authored paths.
        ///
        /// There is no mechanism for updating ratings after creation.
        #[serde(default = "default_initial_rating")]
        initial_rating: f64,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                storage_key,
                seed_sample_data,
                default_cover_image,
                initial_rating,
            } => Self {
                storage_key,
                seed_sample_data,
                default_cover_image,
                initial_rating,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            storage_key: config.storage_key,
            seed_sample_data: config.seed_sample_data,
            default_cover_image: config.default_cover_image,
            initial_rating: config.initial_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nstorage_key = \"my-paths\"\nseed_sample_data = false\ninitial_rating = 3.5\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.storage_key(), "my-paths");
        assert!(!config.seed_sample_data);
        assert!((config.initial_rating() - 3.5).abs() < f64::EPSILON);
        assert_eq!(config.default_cover_image(), default_cover_image());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nseed_sample_data = \"yes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn load_or_default_falls_back_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(tmp.path()), Config::default());
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_storage_key("elsewhere");
        config.seed_sample_data = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
