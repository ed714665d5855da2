use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logger::Logger;

pub const CONFIG_FILE_NAME: &str = "cms.config.toml";

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 15_000;

/// Configuration for the cms CLI
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal name or ID used when `--portal` is not given
    pub default_portal: Option<String>,
    /// Send anonymous command usage events (default: true)
    pub allow_usage_tracking: Option<bool>,
    /// Request timeout in milliseconds
    pub http_timeout: Option<u64>,
    /// Overrides the API origin derived from each portal's `env`
    pub api_base_url: Option<String>,
    pub portals: Vec<PortalConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub portal_id: Option<u64>,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub personal_access_key: Option<String>,
    #[serde(default)]
    pub env: Env,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    ApiKey,
    PersonalAccessKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    #[default]
    Prod,
    Qa,
}

impl PortalConfig {
    /// Portal ID, or 0 for an entry that failed validation.
    pub fn id(&self) -> u64 {
        self.portal_id.unwrap_or_default()
    }

    /// Name when set, otherwise the numeric ID.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id().to_string(),
        }
    }
}

impl Config {
    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Look up a portal by name, then by numeric ID.
    pub fn portal(&self, name_or_id: &str) -> Option<&PortalConfig> {
        let name_or_id = name_or_id.trim();
        if let Some(portal) = self
            .portals
            .iter()
            .find(|p| p.name.as_deref() == Some(name_or_id))
        {
            return Some(portal);
        }
        let id: u64 = name_or_id.parse().ok()?;
        self.portals.iter().find(|p| p.portal_id == Some(id))
    }

    /// The explicitly selected portal, falling back to `default_portal`.
    pub fn selected_portal(&self, selection: Option<&str>) -> Option<&PortalConfig> {
        selection
            .or(self.default_portal.as_deref())
            .and_then(|name_or_id| self.portal(name_or_id))
    }

    pub fn usage_tracking_enabled(&self) -> bool {
        self.allow_usage_tracking.unwrap_or(true)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS))
    }

    /// Check the structure of the loaded config, logging every problem found.
    pub fn validate(&self, logger: &Logger) -> bool {
        let mut valid = true;

        if self.portals.is_empty() {
            logger.error("No portals found in the config");
            return false;
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for (index, portal) in self.portals.iter().enumerate() {
            match portal.portal_id {
                Some(id) if id > 0 => {
                    if !ids.insert(id) {
                        logger.error(format!(
                            "Multiple portals with portal_id {id} found in the config"
                        ));
                        valid = false;
                    }
                }
                _ => {
                    logger.error(format!(
                        "Portal at position {} is missing a valid portal_id",
                        index + 1
                    ));
                    valid = false;
                }
            }

            if let Some(name) = &portal.name {
                if name.chars().any(char::is_whitespace) {
                    logger.error(format!(
                        "Portal name \"{name}\" cannot contain spaces"
                    ));
                    valid = false;
                }
                if !names.insert(name.as_str()) {
                    logger.error(format!(
                        "Multiple portals with name \"{name}\" found in the config"
                    ));
                    valid = false;
                }
            }
        }

        if let Some(default) = &self.default_portal {
            if self.portal(default).is_none() {
                logger.error(format!(
                    "The default_portal \"{default}\" does not match any configured portal"
                ));
                valid = false;
            }
        }

        valid
    }
}

/// Resolve which config file to use.
///
/// An explicit path is taken as given (relative to `cwd`). Otherwise search
/// for `cms.config.toml` from `cwd` upward, then in the home directory.
pub fn locate(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(cwd.join(path));
    }
    find_config_file(cwd).or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .filter(|candidate| candidate.is_file())
    })
}

/// Search for cms.config.toml from start_dir upward
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
