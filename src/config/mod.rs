pub mod settings;

use std::path::Path;

use crate::backend::Backend;
use crate::error::Error;
use settings::Config;

/// Locates and loads the configuration, then opens the backend for the mode
/// it selects. Runs once per process.
pub fn resolve(explicit: Option<&Path>) -> Result<Backend, Error> {
    let path = Config::locate(explicit)?;
    log::debug!("using configuration {}", path.display());
    let settings = Config::from_file(&path)?.settings()?;
    Backend::connect(settings)
}
