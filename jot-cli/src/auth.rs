use anyhow::{bail, Context, Result};
use jot_model::Provider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::state::{ensure_jot_home, write_atomic};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
}

fn env_var_for(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => "OPENAI_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
    }
}

impl AuthState {
    /// The key for `provider`; the environment wins over the file.
    pub fn key_for(&self, provider: Provider) -> Option<String> {
        self.key_with_env(provider, |name| std::env::var(name).ok())
    }

    fn key_with_env(
        &self,
        provider: Provider,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let stored = match provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
        };
        env(env_var_for(provider))
            .filter(|k| !k.trim().is_empty())
            .or_else(|| stored.filter(|k| !k.trim().is_empty()).map(str::to_string))
    }

    fn set(&mut self, provider: Provider, key: String) {
        match provider {
            Provider::OpenAI => self.openai_api_key = Some(key),
            Provider::Anthropic => self.anthropic_api_key = Some(key),
        }
    }
}

pub fn auth_path() -> Result<PathBuf> {
    Ok(ensure_jot_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    load_auth_from(&auth_path()?)
}

pub fn load_auth_from(p: &Path) -> Result<AuthState> {
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth_to(p: &Path, auth: &AuthState) -> Result<()> {
    let s = serde_json::to_string_pretty(auth)?;
    write_atomic(p, &s)
}

fn prompt_secret(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s).context("read key from stdin")?;
    Ok(s.trim().to_string())
}

/// Store an API key for `provider`, prompting on stdin when `key` is `None`.
pub fn set_key(provider: Provider, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(k) => k.trim().to_string(),
        None => prompt_secret(&format!("Paste {provider} API key"))?,
    };
    if key.is_empty() {
        bail!("no key given");
    }
    let expected = match provider {
        Provider::OpenAI => "sk-",
        Provider::Anthropic => "sk-ant-",
    };
    if !key.starts_with(expected) {
        eprintln!("warning: key doesn't start with {expected}; saving anyway");
    }

    let p = auth_path()?;
    let mut auth = load_auth_from(&p)?;
    auth.set(provider, key);
    save_auth_to(&p, &auth)?;
    println!("Saved {provider} API key to {}", p.display());
    if std::env::var(env_var_for(provider)).is_ok_and(|v| !v.trim().is_empty()) {
        println!("Note: {} is set and takes precedence.", env_var_for(provider));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_file() {
        let auth = AuthState {
            openai_api_key: Some("sk-file".to_string()),
            anthropic_api_key: Some("  ".to_string()),
        };
        let no_env = |_: &str| None;
        assert_eq!(auth.key_with_env(Provider::OpenAI, no_env).as_deref(), Some("sk-file"));
        assert_eq!(auth.key_with_env(Provider::Anthropic, no_env), None);

        let env = |name: &str| (name == "OPENAI_API_KEY").then(|| "sk-env".to_string());
        assert_eq!(auth.key_with_env(Provider::OpenAI, env).as_deref(), Some("sk-env"));

        let blank_env = |_: &str| Some(String::new());
        assert_eq!(auth.key_with_env(Provider::OpenAI, blank_env).as_deref(), Some("sk-file"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("auth.json");
        assert!(load_auth_from(&p).unwrap().openai_api_key.is_none());

        let mut auth = AuthState::default();
        auth.set(Provider::Anthropic, "sk-ant-xyz".to_string());
        save_auth_to(&p, &auth).unwrap();

        let raw = fs::read_to_string(&p).unwrap();
        assert!(!raw.contains("openai_api_key"));
        let back = load_auth_from(&p).unwrap();
        assert_eq!(back.anthropic_api_key.as_deref(), Some("sk-ant-xyz"));
    }
}
