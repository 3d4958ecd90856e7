use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use curbside_core::ConfigError;
use curbside_provider_recollect::{DEFAULT_AREA, DEFAULT_SERVICE_ID, RecollectConfig};

const BASE_URL_VAR: &str = "RECOLLECT_BASE_URL";
const AREA_VAR: &str = "RECOLLECT_AREA";
const SERVICE_ID_VAR: &str = "RECOLLECT_SERVICE_ID";
const TIMEOUT_VAR: &str = "RECOLLECT_TIMEOUT_SECS";

pub(crate) fn recollect_from_env() -> Result<RecollectConfig, ConfigError> {
    recollect_from_lookup(|var| env::var(var).ok())
}

fn recollect_from_lookup<F>(lookup: F) -> Result<RecollectConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let area = optional_var::<String, _>(&lookup, AREA_VAR)?
        .unwrap_or_else(|| DEFAULT_AREA.to_owned());
    let service_id = optional_var::<u32, _>(&lookup, SERVICE_ID_VAR)?.unwrap_or(DEFAULT_SERVICE_ID);

    let mut config = RecollectConfig::new(area, service_id);

    if let Some(base_url) = optional_var::<String, _>(&lookup, BASE_URL_VAR)? {
        config = config.with_base_url(base_url);
    }

    if let Some(seconds) = optional_var::<u64, _>(&lookup, TIMEOUT_VAR)? {
        if seconds == 0 {
            return Err(ConfigError::Invalid {
                var: TIMEOUT_VAR,
                reason: "must be at least one second".to_owned(),
            });
        }
        config = config.with_timeout(Duration::from_secs(seconds));
    }

    Ok(config)
}

/// Parse an optional variable, treating blank values as unset.
fn optional_var<T, F>(lookup: F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|err: T::Err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
        })
}
