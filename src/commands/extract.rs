use std::path::PathBuf;

use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::{parse_file_id, required, CommandOutput};
use crate::error::Error;

/// `extract <file_id> [filename]`: writes a stored file back to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    /// Id as typed; this text is signed and sent.
    pub raw_id: String,
    pub file_id: i64,
    pub filename: Option<String>,
}

impl Extract {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let raw_id = required(args, 0, "No file_id specified.")?;
        let file_id = parse_file_id(raw_id)?;
        Ok(Self {
            raw_id: raw_id.to_string(),
            file_id,
            filename: args.get(1).cloned(),
        })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        match backend {
            Backend::Remote(client) => {
                // the server does not send a name, so one must be given
                let filename = self
                    .filename
                    .as_deref()
                    .ok_or_else(|| Error::invalid_argument("No filename specified."))?;
                let request = RemoteRequest::with_subject(Route::Extract, &self.raw_id)
                    .param("f", self.raw_id.as_str());
                let path = PathBuf::from(filename);
                let bytes = client.get_to_file(&request, &path).await?;
                Ok(CommandOutput::FileWritten { path, bytes })
            }
            Backend::Local(local) => local
                .extract(self.file_id, self.filename.as_deref())
                .map(CommandOutput::Text),
        }
    }
}
