//! Where the host keeps its config and logs.
//!
//! # Resolution order
//!
//! 1. A directory passed on the command line
//! 2. `BRIDGE_CONFIG_DIR`
//! 3. `dirs::config_dir()/bridge-host`

use crate::error::HostError;

use std::env;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

pub const ENV_CONFIG_DIR: &str = "BRIDGE_CONFIG_DIR";

const APP_DIR_NAME: &str = "bridge-host";
const LOG_DIR_NAME: &str = "logs";

/// Resolves the config directory. Does not create it.
///
/// # Errors
///
/// Returns [`HostError::Host`] if no argument or override is given and the
/// platform has no config directory.
pub fn config_dir(cli_dir: Option<PathBuf>) -> Result<PathBuf, HostError> {
    if let Some(dir) = cli_dir {
        info!("Using config directory from command line: {}", dir.display());
        return Ok(dir);
    }

    if let Ok(custom_dir) = env::var(ENV_CONFIG_DIR) {
        info!("Using {} override: {}", ENV_CONFIG_DIR, custom_dir);
        return Ok(PathBuf::from(custom_dir));
    }

    let dir = dirs::config_dir()
        .map(|base| base.join(APP_DIR_NAME))
        .ok_or_else(|| HostError::host("No platform config directory available"))?;
    debug!("Platform config dir: {}", dir.display());
    Ok(dir)
}

pub fn log_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(LOG_DIR_NAME)
}

/// Loads `.env` from the current directory, then from next to the
/// executable. Returns the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {}", path.display());
        return Some(path);
    }

    let exe_path = env::current_exe().ok()?;
    let env_path = exe_path.parent()?.join(".env");
    if !env_path.exists() {
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => {
            info!("Loaded .env from: {}", env_path.display());
            Some(env_path)
        }
        Err(e) => {
            warn!("Failed to parse .env at {}: {}", env_path.display(), e);
            None
        }
    }
}
