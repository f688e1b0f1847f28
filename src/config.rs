use crate::constants;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn get_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_dir = PathBuf::from(home)
        .join(".config")
        .join(constants::CONFIG_DIR_NAME);
    fs::create_dir_all(&config_dir).ok();
    config_dir.join(constants::CONFIG_FILE)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "ltoken_v2")]
    pub ltoken: String,
    #[serde(rename = "ltuid_v2")]
    pub ltuid: String,
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsr_uid: Option<String>,
}

impl Config {
    /// Effective Star Rail UID: the explicit `hsr_uid` when present, else the
    /// Genshin UID. An empty value means the second panel is not configured.
    pub fn effective_hsr_uid(&self) -> Option<&str> {
        let uid = self.hsr_uid.as_deref().unwrap_or(&self.uid);
        if uid.is_empty() { None } else { Some(uid) }
    }
}

/// Account ids are numeric and at least 8 digits.
pub fn is_valid_uid(uid: &str) -> bool {
    uid.len() >= constants::UID_MIN_LEN && uid.bytes().all(|b| b.is_ascii_digit())
}

/// Pulls `ltoken_v2` and `ltuid_v2` out of a raw Cookie header string, as
/// copied from the browser's developer tools while logged in to HoYoLAB.
pub fn parse_cookie_string(raw: &str) -> Result<(String, String), ConfigError> {
    let mut ltoken = None;
    let mut ltuid = None;
    for pair in raw.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match name.trim() {
            "ltoken_v2" if !value.is_empty() => ltoken = Some(value.to_string()),
            "ltuid_v2" if !value.is_empty() => ltuid = Some(value.to_string()),
            _ => {}
        }
    }
    match (ltoken, ltuid) {
        (Some(ltoken), Some(ltuid)) => Ok((ltoken, ltuid)),
        (None, _) => Err(ConfigError::MissingCookie("ltoken_v2")),
        (_, None) => Err(ConfigError::MissingCookie("ltuid_v2")),
    }
}

pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let path = get_config_path();

        if path.exists() {
            let mut backup = path.as_os_str().to_owned();
            backup.push(constants::CONFIG_BACKUP_SUFFIX);
            fs::rename(&path, PathBuf::from(backup))?;
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, &json)?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(constants::SECURE_FILE_MODE);
            fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = get_config_path();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let json = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&json)?;
        Ok(config)
    }
}
