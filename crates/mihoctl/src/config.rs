//! Resolves the runtime `ClientConfig` from the config file, the
//! `MIHOCTL_*` environment, and global flags, in increasing precedence.

use mihoctl_config::Config;
use mihoctl_core::{ClientConfig, SettingKey};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Stored settings with command-line overrides applied.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = mihoctl_config::load_config()?;

    if let Some(ref address) = global.api_address {
        cfg.set(SettingKey::ApiAddress, address)?;
    }
    if let Some(ref secret) = global.secret {
        cfg.set(SettingKey::Secret, secret)?;
    }
    if let Some(timeout) = global.timeout {
        cfg.set(SettingKey::Timeout, &timeout.to_string())?;
    }
    Ok(cfg)
}

pub fn client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    Ok(resolve(global)?.to_client_config()?)
}
