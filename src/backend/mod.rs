pub mod local;

use crate::api::client::RemoteClient;
use crate::config::settings::Settings;
use crate::error::Error;
use crate::vault::FileVault;
pub use local::LocalBackend;

/// Where commands are executed, fixed for the life of the process.
pub enum Backend {
    Remote(RemoteClient),
    Local(LocalBackend),
}

impl Backend {
    /// Builds the HTTP client or opens the embedded vault.
    pub fn connect(settings: Settings) -> Result<Self, Error> {
        match settings {
            Settings::Remote(remote) => {
                log::info!("remote mode: {}", remote.base_url);
                Ok(Backend::Remote(RemoteClient::new(&remote)?))
            }
            Settings::Local(local) => {
                log::info!(
                    "local mode: {} database {}, files in {}",
                    local.db_type,
                    local.db_connect,
                    local.root_path.display()
                );
                Ok(Backend::Local(LocalBackend::new(FileVault::open(&local)?)))
            }
        }
    }
}
