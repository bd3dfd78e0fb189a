//! Runner configuration via `morph.toml`
//!
//! The file is optional. Values it does not set fall back to the defaults
//! below, and command-line flags override both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "morph.toml";

/// Image dimensions used by the generators
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct ImageConfig {
    /// Width in pixels
    #[serde(default = "default_dimension")]
    pub width: usize,
    /// Height in pixels
    #[serde(default = "default_dimension")]
    pub height: usize,
}

fn default_dimension() -> usize {
    256
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: default_dimension(),
            height: default_dimension(),
        }
    }
}

/// Noise sampling parameters
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct NoiseConfig {
    /// Sampling step per pixel
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    /// Permutation seed
    #[serde(default)]
    pub seed: u64,
}

fn default_frequency() -> f64 {
    0.05
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            seed: 0,
        }
    }
}

/// Runner configuration loaded from `morph.toml`.
///
/// # Example
///
/// ```toml
/// log_level = "info"
/// output = "morph_output.png"
///
/// [image]
/// width = 256
/// height = 256
///
/// [noise]
/// frequency = 0.05
/// seed = 0
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MorphConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default output path
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Image dimensions
    #[serde(default)]
    pub image: ImageConfig,
    /// Noise parameters
    #[serde(default)]
    pub noise: NoiseConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("morph_output.png")
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output: default_output(),
            image: ImageConfig::default(),
            noise: NoiseConfig::default(),
        }
    }
}

impl MorphConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Morph runner configuration
#
# Tracing filter used when RUST_LOG is not set
log_level = "info"

# Where generated images are written
output = "morph_output.png"

[image]
width = 256
height = 256

# Noise is sampled at (x * frequency, y * frequency)
[noise]
frequency = 0.05
seed = 0
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))
    }

    /// Config from `explicit` if given, else `morph.toml` in the working
    /// directory if present, else defaults.
    ///
    /// # Errors
    ///
    /// An explicit path that cannot be read, or any file that does not parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `true` if the file was created.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml())
            .with_context(|| format!("failed to write config file '{}'", path.display()))?;
        Ok(true)
    }
}
