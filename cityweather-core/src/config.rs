use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use url::Url;

/// Environment variable that overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "CITYWEATHER_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// base_url = "http://192.168.1.10:3000"
/// data_dir = "/home/me/.local/share/cityweather"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Backend base URL; the `weatherData` endpoint is resolved against it.
    pub base_url: Option<String>,

    /// Where favorites and recent searches are kept. Defaults to the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from the platform config dir. A missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write as TOML, creating the parent directory on first save.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Failed to serialize cityweather config")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding the persisted lists.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Resolve the backend base URL: environment first, then the config file,
    /// then [`DEFAULT_BASE_URL`].
    pub fn base_url(&self) -> Result<Url> {
        let env = std::env::var(BASE_URL_ENV).ok();
        self.resolve_base_url(env.as_deref())
    }

    fn resolve_base_url(&self, env_override: Option<&str>) -> Result<Url> {
        let raw = env_override
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(self.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);

        parse_base_url(raw)
    }

    /// Validate and store a new base URL.
    pub fn set_base_url(&mut self, raw: &str) -> Result<()> {
        let url = parse_base_url(raw)?;
        self.base_url = Some(url.to_string());
        Ok(())
    }
}

/// Accept only absolute http(s) URLs.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .with_context(|| format!("Invalid backend base URL '{raw}'"))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!(
            "Unsupported URL scheme '{other}' in '{raw}'.\n\
             Hint: run `cityweather configure` and enter an http:// or https:// address."
        )),
    }
}
