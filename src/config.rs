use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root of the vault; notes land in `<vault_path>/Inbox`.
    pub vault_path: String,
    /// Google authorized-user token.json. Defaults to the config dir.
    pub credentials_path: Option<String>,
    pub poll_interval_secs: Option<u64>,
    /// Seen-set sidecar file. Defaults to the config dir.
    pub state_path: Option<String>,
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("vault_watcher"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_credentials_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("token.json");
    Ok(p)
}

pub fn default_state_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("processed_ids");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            vault_path: "/home/you/Vault".to_string(),
            credentials_path: None,
            poll_interval_secs: Some(10),
            state_path: None,
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {} — edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}

pub fn resolve_credentials_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.credentials_path {
        Ok(PathBuf::from(p))
    } else {
        default_credentials_path()
    }
}

pub fn resolve_state_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.state_path {
        Ok(PathBuf::from(p))
    } else {
        default_state_path()
    }
}
