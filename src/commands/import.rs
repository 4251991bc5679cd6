use std::path::PathBuf;

use crate::api::models::{RemoteRequest, Route, Upload};
use crate::backend::Backend;
use crate::commands::{required, CommandOutput};
use crate::error::Error;
use crate::util::date::{format_timestamp, local_timestamp};

/// `import <file> [filename]`: stores a local file, optionally under another name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub source: PathBuf,
    /// Name recorded in the vault; defaults to the source argument.
    pub filename: String,
}

impl Import {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let source = required(args, 0, "No file specified.")?;
        let filename = args.get(1).map(String::as_str).unwrap_or(source);
        Ok(Self {
            source: PathBuf::from(source),
            filename: filename.to_string(),
        })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        let metadata = tokio::fs::metadata(&self.source).await?;
        if !metadata.is_file() {
            return Err(Error::InvalidArgument(format!(
                "Not a file: {}",
                self.source.display()
            )));
        }
        let modified = local_timestamp(metadata.modified()?);

        let output = match backend {
            Backend::Remote(client) => {
                let request = RemoteRequest::with_subject(Route::Import, &self.filename);
                let upload = Upload {
                    file_field: "file",
                    fields: vec![
                        ("fn", self.filename.clone()),
                        ("ts", format_timestamp(&modified)),
                    ],
                };
                let body = client.post_multipart(&request, &upload, &self.source).await?;
                CommandOutput::Raw(body)
            }
            Backend::Local(local) => {
                CommandOutput::Text(local.import(&self.source, &self.filename, modified)?)
            }
        };
        Ok(output)
    }
}
