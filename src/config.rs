use anyhow::{anyhow, Result};
use dotenv::dotenv;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    pub posts_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            posts_path: PathBuf::from("posts"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Falls back to `input.posts_path` when unset.
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub strict: bool,
}

/// Order in which a post's files are visited. The last qualifying file wins.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Lexicographic by file name.
    #[default]
    Sorted,
    /// Whatever the operating system returns.
    Filesystem,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Sorted => write!(f, "sorted"),
            Order::Filesystem => write!(f, "filesystem"),
        }
    }
}

impl std::str::FromStr for Order {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sorted" => Ok(Order::Sorted),
            "filesystem" => Ok(Order::Filesystem),
            other => Err(anyhow!("Unknown order '{}', expected sorted or filesystem", other)),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        dotenv().ok();

        // First try to load from environment variables
        if std::env::var_os("POSTS_PATH").is_some() {
            return Self::from_env();
        }

        // Then a config file, then the built-in defaults
        match Self::from_file()? {
            Some(config) => Ok(config),
            None => Ok(Self::default()),
        }
    }

    fn from_env() -> Result<Self> {
        let order = match std::env::var("FLATTEN_ORDER") {
            Ok(order) => order.parse()?,
            Err(_) => Order::default(),
        };
        let strict = std::env::var("FLATTEN_STRICT")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            input: InputConfig {
                posts_path: PathBuf::from(std::env::var("POSTS_PATH")?),
            },
            output: OutputConfig {
                output_path: std::env::var("FLATTEN_OUTPUT_PATH").ok().map(PathBuf::from),
                order,
                strict,
            },
        })
    }

    fn from_file() -> Result<Option<Self>> {
        let config_paths = vec!["flatten.toml", "Flatten.toml"];

        for path in config_paths {
            if let Ok(content) = std::fs::read_to_string(path) {
                tracing::debug!("Loading configuration from {}", path);
                return Self::from_toml(&content).map(Some);
            }
        }

        Ok(None)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .output_path
            .clone()
            .unwrap_or_else(|| self.input.posts_path.clone())
    }
}
