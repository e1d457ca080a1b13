mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./clipserve.toml",
        "~/.config/clipserve/config.toml",
        "/etc/clipserve/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }
    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("Upload size limit cannot be 0");
    }

    let clip = &config.clip;
    if clip.min_secs == 0 {
        anyhow::bail!("Clip minimum duration must be at least 1 second");
    }
    if clip.min_secs > clip.max_secs {
        anyhow::bail!(
            "Clip duration bounds are inverted: min {} > max {}",
            clip.min_secs,
            clip.max_secs
        );
    }
    if clip.default_secs < clip.min_secs || clip.default_secs > clip.max_secs {
        anyhow::bail!(
            "Default clip duration {} is outside [{}, {}]",
            clip.default_secs,
            clip.min_secs,
            clip.max_secs
        );
    }

    if let Some(screenshot) = &config.screenshot {
        if screenshot.service_url.trim().is_empty() {
            anyhow::bail!("Screenshot service URL cannot be empty");
        }
        if screenshot.api_token.trim().is_empty() {
            anyhow::bail!("Screenshot service requires an API token");
        }
    }

    if let Some(cookies) = &config.fetch.cookies_file {
        if config.fetch.require_credentials && !cookies.exists() {
            tracing::warn!(
                "Cookie file {:?} does not exist; downloads will fail until it appears",
                cookies
            );
        }
    }

    Ok(())
}
