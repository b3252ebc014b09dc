use figment::providers::Env;
use figment::Figment;
use msgd::utils::BrokerDuration;
use serde::Deserialize;
use tracing::info;

use crate::server_error::ServerError;

#[derive(Debug, Deserialize)]
struct RawConfig {
    host: String,
    retention_time: String,
    root_dir: Option<String>,
}

/// Server configuration, loaded entirely from bare (unprefixed) environment
/// variables: `HOST` and `RETENTION_TIME` are required, `ROOT_DIR` is
/// optional and selects which backing store `main` constructs. There is no
/// file layer: spec.md §6 names only these three environment variables,
/// unlike the teacher's TOML-plus-env `ConfigProvider`.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub retention_time: BrokerDuration,
    /// `Some(dir)` selects the file backing store rooted at `dir`;
    /// `None` (the variable unset) selects the in-memory store.
    pub root_dir: Option<String>,
}

pub fn load() -> Result<Config, ServerError> {
    let raw: RawConfig = Figment::new()
        .merge(Env::raw())
        .extract()
        .map_err(|e| ServerError::Config(e.to_string()))?;

    let retention_time = raw
        .retention_time
        .parse::<BrokerDuration>()
        .map_err(|e| ServerError::Config(format!("invalid RETENTION_TIME: {e}")))?;

    info!(
        host = %raw.host,
        retention_time = %retention_time,
        root_dir = ?raw.root_dir,
        "configuration loaded"
    );

    Ok(Config {
        host: raw.host,
        retention_time,
        root_dir: raw.root_dir,
    })
}
