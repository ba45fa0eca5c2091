use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::session::DEFAULT_ATTEMPT_THRESHOLD;

const CONFIG_DIR_NAME: &str = ".codementor";
const CONFIG_FILE_NAME: &str = "config.toml";
const CREDENTIAL_FILE_NAME: &str = "credential";

const DEFAULT_MODEL_ID: &str = "llama-3.3-70b-versatile";
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub tutor: TutorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub id: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub attempt_threshold: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            tutor: TutorConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_MODEL_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            attempt_threshold: DEFAULT_ATTEMPT_THRESHOLD,
        }
    }
}

/// Load `~/.codementor/config.toml`, writing a default file on first run.
pub fn load_config() -> io::Result<AppConfig> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let config_file = dir.join(CONFIG_FILE_NAME);

    if !config_file.exists() {
        let default = format!(
            "[model]\nid = \"{DEFAULT_MODEL_ID}\"\nbase_url = \"{DEFAULT_BASE_URL}\"\n\n\
             [tutor]\nattempt_threshold = {DEFAULT_ATTEMPT_THRESHOLD}\n"
        );
        fs::write(&config_file, default)?;
    }

    let text = fs::read_to_string(config_file)?;
    parse_config(&text).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

pub fn parse_config(text: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str::<AppConfig>(text)
}

/// The single piece of persisted state: one credential string, retrievable
/// and removable by its fixed location.
pub fn load_credential() -> io::Result<Option<String>> {
    load_credential_in(&config_dir()?)
}

pub fn store_credential(key: &str) -> io::Result<()> {
    store_credential_in(&config_dir()?, key)
}

pub fn remove_credential() -> io::Result<()> {
    remove_credential_in(&config_dir()?)
}

fn load_credential_in(dir: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(dir.join(CREDENTIAL_FILE_NAME)) {
        Ok(text) => {
            let trimmed = text.trim().to_string();
            Ok(if trimmed.is_empty() { None } else { Some(trimmed) })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn store_credential_in(dir: &Path, key: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(CREDENTIAL_FILE_NAME), key.trim())
}

fn remove_credential_in(dir: &Path) -> io::Result<()> {
    match fs::remove_file(dir.join(CREDENTIAL_FILE_NAME)) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Masked rendering for the settings screen; never shows the middle of the
/// key.
pub fn masked_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "\u{2022}".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "\u{2022}".repeat(18))
}

fn config_dir() -> io::Result<PathBuf> {
    Ok(home_dir()?.join(CONFIG_DIR_NAME))
}

fn home_dir() -> io::Result<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))
}
