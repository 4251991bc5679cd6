use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::{required, CommandOutput};
use crate::error::Error;

/// `hash <hash>`: files whose content has the given SHA-256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    pub hash: String,
}

impl Hash {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let hash = required(args, 0, "No hash specified.")?;
        Ok(Self {
            hash: hash.to_string(),
        })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        let output = match backend {
            Backend::Remote(client) => {
                let request = RemoteRequest::with_subject(Route::Hash, &self.hash)
                    .param("h", self.hash.as_str());
                CommandOutput::Raw(client.get(&request).await?)
            }
            Backend::Local(local) => CommandOutput::Text(local.hash(&self.hash)?),
        };
        Ok(output)
    }
}
