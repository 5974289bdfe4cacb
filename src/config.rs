use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Folder holding the persisted library (chapters and world records).
    #[serde(default = "default_library")]
    pub library_folder: String,

    /// Skip interactive prompts; generate and save without confirmation.
    #[serde(default)]
    pub unattended: bool,

    /// When set, translate generated dialogue into this language before
    /// saving the chapter.
    #[serde(default)]
    pub translate_to: Option<String>,

    pub gemini: GeminiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,
}

fn default_library() -> String {
    "library".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-3.0-generate-002".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            anyhow::bail!("config.yml not found. Please create one.");
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write("config.yml", content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.library_folder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_applies_defaults() {
        let yaml = "gemini:\n  api_key: test-key\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.library_folder, "library");
        assert!(!config.unattended);
        assert!(config.translate_to.is_none());
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.image_model, "imagen-3.0-generate-002");
    }

    #[test]
    fn test_full_config_round_trip() {
        let yaml = "library_folder: out\nunattended: true\ntranslate_to: Japanese\ngemini:\n  api_key: k\n  model: m\n  image_model: im\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.library_folder, "out");
        assert!(config.unattended);
        assert_eq!(config.translate_to.as_deref(), Some("Japanese"));
        assert_eq!(config.gemini.model, "m");

        let dumped = serde_yaml_ng::to_string(&config).unwrap();
        let reparsed: Config = serde_yaml_ng::from_str(&dumped).unwrap();
        assert_eq!(reparsed.gemini.image_model, "im");
    }
}
