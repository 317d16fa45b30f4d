use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Errors reading or interpreting environment variables.
#[derive(Debug, Error)]
pub enum EnvVarError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    Missing(String),

    /// The variable is set but its value cannot be cast to the requested type.
    #[error("Unable to cast value {value:?} of {name} to {ty}")]
    Cast {
        /// Variable name.
        name: String,
        /// Raw value found in the environment.
        value: String,
        /// Target type name.
        ty: &'static str,
    },
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
pub fn get_env_var(name: &str) -> Result<String, EnvVarError> {
    std::env::var(name).map_err(|_| EnvVarError::Missing(name.to_string()))
}

/// Reads an environment variable and parses it into `T`.
///
/// Missing variables and unparseable values both yield an [`EnvVarError`],
/// so callers can treat "not set" and "set to garbage" uniformly at startup.
pub fn get_env_var_parsed<T>(name: &str) -> Result<T, EnvVarError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = get_env_var(name)?;
    parse_env_value(name, &raw)
}

fn parse_env_value<T>(name: &str, raw: &str) -> Result<T, EnvVarError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|_| EnvVarError::Cast {
        name: name.to_string(),
        value: raw.to_string(),
        ty: std::any::type_name::<T>(),
    })
}
