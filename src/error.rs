use crate::api::client::ClientError;
use crate::config::settings::ConfigError;
use crate::vault::VaultError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("No data from server for {0:?}.")]
    Stalled(std::time::Duration),

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    LocalEngine(#[from] VaultError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid or missing command.")]
    Usage,
}

impl Error {
    pub fn invalid_argument(reason: &str) -> Self {
        Error::InvalidArgument(reason.to_string())
    }

    // usage and flag errors get the help text printed after them
    pub fn wants_usage(&self) -> bool {
        matches!(self, Error::Usage)
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => Error::Transport(e),
            ClientError::Stalled(timeout) => Error::Stalled(timeout),
            ClientError::Remote(message) => Error::Remote(message),
            ClientError::Io(e) => Error::Io(e),
        }
    }
}
