use crate::error::{ResizeError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref PIN_RANGE_REGEX: Regex = Regex::new("^([0-9]{1,2})-([0-9]{1,2})$").unwrap();
}

/// Checks a `low-high` pinning range against the number of host cores.
///
/// The range is accepted only when `low < high` and `high < host_cores`. On
/// success the input string is handed back untouched, since that is what ends
/// up in the `cpuset` attribute.
pub fn validate_pinning(arg: &str, host_cores: usize) -> Result<String> {
    let invalid = || ResizeError::InvalidArgument(arg.to_string());
    let caps = PIN_RANGE_REGEX.captures(arg).ok_or_else(invalid)?;
    let low: usize = caps[1].parse().map_err(|_| invalid())?;
    let high: usize = caps[2].parse().map_err(|_| invalid())?;
    if low >= high || high >= host_cores {
        return Err(invalid());
    }
    Ok(arg.to_string())
}

/// clap value parser for `-p/--pin`, validated against the cores of this host.
pub fn parse_pinning(arg: &str) -> std::result::Result<String, String> {
    validate_pinning(arg, num_cpus::get()).map_err(|e| e.to_string())
}
