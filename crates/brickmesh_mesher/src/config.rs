use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::vertex::VERT_LEN;

/// Mesher settings, usually read from a `mesher.toml`.
///
/// ```toml
/// vert_len = 12
/// context_identifier = "main"
/// worker_threads = 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    /// Floats per vertex record.
    pub vert_len: usize,
    /// Rendering context the atlas handle is looked up for.
    pub context_identifier: String,
    /// Mesh worker threads; derived from the available parallelism when unset.
    pub worker_threads: Option<usize>,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            vert_len: VERT_LEN,
            context_identifier: "main".to_string(),
            worker_threads: None,
        }
    }
}

impl MesherConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vert_len < VERT_LEN {
            return Err(ConfigError::Invalid {
                reason: format!("vert_len must be at least {VERT_LEN}, got {}", self.vert_len),
            });
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::Invalid {
                reason: "worker_threads must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn worker_thread_count(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            let available = std::thread::available_parallelism()
                .map(|parallelism| parallelism.get())
                .unwrap_or(4);
            available.saturating_sub(1).clamp(2, 8)
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        source: toml::de::Error,
    },
    Invalid {
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read mesher config {}: {source}", path.display())
            }
            Self::Parse { source } => write!(f, "failed to parse mesher config: {source}"),
            Self::Invalid { reason } => write!(f, "invalid mesher config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{ConfigError, MesherConfig};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("brickmesh_{name}_{nanos}.toml"))
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = MesherConfig::from_toml_str("worker_threads = 3").expect("valid config");
        assert_eq!(config.vert_len, 12);
        assert_eq!(config.context_identifier, "main");
        assert_eq!(config.worker_thread_count(), 3);

        let config = MesherConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, MesherConfig::default());
        assert!((2..=8).contains(&config.worker_thread_count()));
    }

    #[test]
    fn rejects_invalid_values() {
        let err = MesherConfig::from_toml_str("vert_len = 9").expect_err("9 floats is too few");
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = MesherConfig::from_toml_str("worker_threads = 0").expect_err("zero threads");
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = MesherConfig::from_toml_str("vert_len = \"wide\"").expect_err("not a number");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let path = temp_path("config");
        fs::write(&path, "vert_len = 16\ncontext_identifier = \"minimap\"\n")
            .expect("temp file is writable");

        let config = MesherConfig::load(&path).expect("config loads");
        let _ = fs::remove_file(&path);
        assert_eq!(config.vert_len, 16);
        assert_eq!(config.context_identifier, "minimap");

        let err = MesherConfig::load(temp_path("missing")).expect_err("file does not exist");
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
