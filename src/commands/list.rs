use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::{required, CommandOutput};
use crate::error::Error;

/// `list <path>/`: files stored directly under a vault directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub path: String,
}

impl List {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let path = required(args, 0, "No path specified.")?;
        if !path.ends_with('/') {
            return Err(Error::invalid_argument("Path must end with '/'."));
        }
        Ok(Self {
            path: path.to_string(),
        })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        let output = match backend {
            Backend::Remote(client) => {
                let request = RemoteRequest::with_subject(Route::List, &self.path)
                    .param("p", self.path.as_str());
                CommandOutput::Raw(client.get(&request).await?)
            }
            Backend::Local(local) => CommandOutput::Text(local.list(&self.path)?),
        };
        Ok(output)
    }
}
