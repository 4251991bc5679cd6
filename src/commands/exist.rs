use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::{required, CommandOutput};
use crate::error::Error;

/// `exist <filename>`: ids of files stored under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exist {
    pub filename: String,
}

impl Exist {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let filename = required(args, 0, "No filename specified.")?;
        Ok(Self {
            filename: filename.to_string(),
        })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        let output = match backend {
            Backend::Remote(client) => {
                let request = RemoteRequest::with_subject(Route::Exist, &self.filename)
                    .param("fn", self.filename.as_str());
                CommandOutput::Raw(client.get(&request).await?)
            }
            Backend::Local(local) => CommandOutput::Text(local.exist(&self.filename)?),
        };
        Ok(output)
    }
}
