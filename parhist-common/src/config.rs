use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunConfig {
    #[serde(default)]
    pub workers: Option<usize>, // falls back to available parallelism when None
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Fixed histogram range. Both ends or neither.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RangeConfig {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeConfig {
    pub fn bounds(&self) -> crate::Result<Option<(f64, f64)>> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => Ok(Some((lo, hi))),
            (None, None) => Ok(None),
            _ => Err(crate::HistError::Config(
                "range needs both min and max, or neither".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "text".into()
}
fn default_precision() -> usize {
    4
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            precision: default_precision(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        if let Ok(env_path) = std::env::var("PARHIST_CONFIG") {
            return PathBuf::from(env_path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parhist")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let cfg: Self =
            toml::from_str(content).map_err(|e| crate::HistError::Config(e.to_string()))?;
        cfg.range.bounds()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::HistError::Config(e.to_string()))
    }

    pub fn save(&self) -> crate::Result<PathBuf> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_toml()?)?;
        Ok(path)
    }
}
