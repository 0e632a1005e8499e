use anyhow::{Context, Result};
use jot_core::time::{parse_clock, parse_timezone};
use jot_core::{DayMonthOrder, ParserOptions};
use jot_model::{ModelConfig, Provider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::AuthState;
use crate::state::{ensure_jot_home, write_atomic};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub parser: ParserSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Set false to always use the rule-based parser.
    pub enabled: bool,
    pub provider: Provider,
    /// Empty means the provider's default model.
    pub model: String,
    /// Empty means the provider's public endpoint.
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: Provider::OpenAI,
            model: String::new(),
            base_url: String::new(),
            temperature: 0.1,
            max_tokens: 500,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// IANA zone used to read and print local times.
    pub timezone: String,
    pub day_month_order: DayMonthOrder,
    /// Time of day for dates given without one, `HH:MM`.
    pub default_due_time: String,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            day_month_order: DayMonthOrder::default(),
            default_due_time: "17:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn parser_options(&self) -> Result<ParserOptions> {
        Ok(ParserOptions {
            timezone: parse_timezone(&self.parser.timezone)?,
            day_month_order: self.parser.day_month_order,
            default_due_time: parse_clock(&self.parser.default_due_time)
                .context("parser.default_due_time")?,
        })
    }

    /// Model settings for the parser chain, or `None` when model parsing is
    /// switched off. The key comes from `auth`.
    pub fn model_config(&self, auth: &AuthState) -> Option<ModelConfig> {
        if !self.llm.enabled {
            return None;
        }
        let provider = self.llm.provider;
        let mut cfg = ModelConfig::new(provider);
        if !self.llm.model.trim().is_empty() {
            cfg.model = self.llm.model.trim().to_string();
        }
        if !self.llm.base_url.trim().is_empty() {
            cfg.base_url = self.llm.base_url.trim().to_string();
        }
        cfg.temperature = self.llm.temperature;
        cfg.max_tokens = self.llm.max_tokens;
        cfg.timeout = Duration::from_secs(self.llm.timeout_secs.max(1));
        cfg.api_key = auth.key_for(provider);
        Some(cfg)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_jot_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    write_atomic(p, &s)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    if !p.exists() {
        println!("# {} not found; showing defaults", p.display());
    }
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(cfg.llm.enabled);
        assert_eq!(cfg.llm.max_tokens, 500);
        assert_eq!(cfg.parser.timezone, "UTC");
        assert_eq!(cfg.log.level, "warn");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            "[llm]\nprovider = \"anthropic\"\n\n[parser]\ntimezone = \"America/Chicago\"\nday_month_order = \"month-first\"\ndefault_due_time = \"09:30\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.llm.provider, Provider::Anthropic);
        assert_eq!(cfg.llm.timeout_secs, 20);

        let opts = cfg.parser_options().unwrap();
        assert_eq!(opts.timezone, chrono_tz::America::Chicago);
        assert_eq!(opts.day_month_order, DayMonthOrder::MonthFirst);
        assert_eq!(opts.default_due_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.llm.enabled = false;
        cfg.parser.timezone = "Europe/Berlin".to_string();
        save_config_to(&p, &cfg).unwrap();

        let back = load_config_from(&p).unwrap();
        assert!(!back.llm.enabled);
        assert_eq!(back.parser.timezone, "Europe/Berlin");
    }

    #[test]
    fn bad_values_are_reported() {
        let mut cfg = Config::default();
        cfg.parser.timezone = "Mars/Olympus".to_string();
        assert!(cfg.parser_options().is_err());

        let mut cfg = Config::default();
        cfg.parser.default_due_time = "5pm".to_string();
        assert!(cfg.parser_options().is_err());
    }

    #[test]
    fn model_config_respects_switch_and_overrides() {
        let auth = AuthState {
            openai_api_key: Some("sk-file".to_string()),
            anthropic_api_key: None,
        };

        let mut cfg = Config::default();
        cfg.llm.model = "gpt-4.1-mini".to_string();
        cfg.llm.base_url = "http://localhost:11434".to_string();
        cfg.llm.timeout_secs = 5;
        let m = cfg.model_config(&auth).unwrap();
        assert_eq!(m.model, "gpt-4.1-mini");
        assert_eq!(m.base_url, "http://localhost:11434");
        assert_eq!(m.timeout, Duration::from_secs(5));

        cfg.llm.enabled = false;
        assert!(cfg.model_config(&auth).is_none());

        let mut cfg = Config::default();
        cfg.llm.provider = Provider::Anthropic;
        let m = cfg.model_config(&auth).unwrap();
        assert_eq!(m.model, Provider::Anthropic.default_model());
    }
}
