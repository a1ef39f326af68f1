//! API key resolution.

use std::path::Path;

use dc_domain::config::ApiKeyConfig;
use dc_domain::error::{Error, Result};

/// Resolve the provider API key.
///
/// Precedence:
/// 1. Process environment variable named by `auth.env` (non-empty)
/// 2. The same variable inside the `.env` file at `auth.dotenv_path`
/// 3. Error
///
/// The `.env` file is only scanned; its other entries are not exported into
/// the process environment.
pub fn resolve_api_key(auth: &ApiKeyConfig) -> Result<String> {
    resolve_with(auth, std::env::var(&auth.env).ok())
}

fn resolve_with(auth: &ApiKeyConfig, from_env: Option<String>) -> Result<String> {
    if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }

    if let Some(key) = read_dotenv_key(&auth.dotenv_path, &auth.env)? {
        tracing::info!(
            env_var = %auth.env,
            path = %auth.dotenv_path.display(),
            "API key resolved from .env file"
        );
        return Ok(key);
    }

    Err(Error::Auth(format!(
        "environment variable '{}' not set and not found in {}",
        auth.env,
        auth.dotenv_path.display()
    )))
}

/// Look up `name` in a dotenv-formatted file.  A missing file is not an
/// error; a malformed one is.
fn read_dotenv_key(path: &Path, name: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let iter = dotenv::from_path_iter(path)
        .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;

    for item in iter {
        let (key, value) =
            item.map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?;
        if key == name {
            let value = value.trim().to_string();
            return Ok((!value.is_empty()).then_some(value));
        }
    }

    Ok(None)
}
