use crate::error::{ResizeError, Result};
use crate::pinning::validate_pinning;
use crate::structs::PatchRequest;
use config::Config;
use std::collections::HashMap;
use std::path::Path;

/// Reads the patch values stored under `option` in a profile file.
///
/// The file maps option keys (`"1"` to `"11"`) to entries with optional
/// `cpu`, `memory` (MB), `queues` and `pin` fields. The format follows the
/// file extension, so YAML, TOML and JSON all work.
pub fn load_profile(path: &Path, option: u8, host_cores: usize) -> Result<PatchRequest> {
    debug!("- Using config file: {}", path.display());
    if !path.is_file() {
        return Err(ResizeError::ConfigError(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let settings = Config::builder()
        .add_source(config::File::from(path))
        .build()?;
    let mut profiles: HashMap<String, PatchRequest> = settings.try_deserialize()?;
    let key = option.to_string();
    let mut request = match profiles.remove(&key) {
        Some(r) => r,
        None => {
            return Err(ResizeError::ConfigError(format!(
                "option {key} is not defined in {}",
                path.display()
            )))
        }
    };
    if request.cpu == Some(0) {
        return Err(ResizeError::ConfigError(format!(
            "option {key} in {}: cpu must be at least 1",
            path.display()
        )));
    }
    if let Some(pin) = request.pin.take() {
        request.pin = Some(validate_pinning(&pin, host_cores)?);
    }
    Ok(request)
}
