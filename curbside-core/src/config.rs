//! Process configuration read once at startup.

use std::env;

/// Environment variable holding the street address every query is answered for.
pub const STREET_ADDRESS_VAR: &str = "STREET_ADDRESS";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Errors raised while reading configuration.
pub enum ConfigError {
    /// A required value is absent or blank.
    #[error("{0} is not configured")]
    Missing(&'static str),
    /// A value is present but cannot be used.
    #[error("{var} is invalid: {reason}")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Settings shared by every request of the process.
pub struct Config {
    street_address: String,
}

impl Config {
    /// Build a configuration for the given street address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the address is blank.
    pub fn new<S: Into<String>>(street_address: S) -> Result<Self, ConfigError> {
        let street_address = street_address.into().trim().to_owned();
        if street_address.is_empty() {
            return Err(ConfigError::Missing(STREET_ADDRESS_VAR));
        }
        Ok(Self { street_address })
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `STREET_ADDRESS` is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `STREET_ADDRESS` is unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup(STREET_ADDRESS_VAR).ok_or(ConfigError::Missing(STREET_ADDRESS_VAR))?;
        Self::new(address)
    }

    /// Street address used for every query.
    #[must_use]
    pub fn street_address(&self) -> &str {
        &self.street_address
    }
}
