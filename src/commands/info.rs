use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::{parse_file_id, CommandOutput};
use crate::error::Error;

/// `info [file_id]`: metadata of one file, or the client banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// Raw and parsed id, when one was given.
    pub file_id: Option<(String, i64)>,
}

impl Info {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let file_id = match args.first() {
            Some(raw) => Some((raw.clone(), parse_file_id(raw)?)),
            None => None,
        };
        Ok(Self { file_id })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        let output = match backend {
            Backend::Remote(client) => {
                let request = match &self.file_id {
                    Some((raw, _)) => {
                        RemoteRequest::with_subject(Route::Info, raw).param("f", raw.as_str())
                    }
                    None => RemoteRequest::new(Route::Info),
                };
                CommandOutput::Raw(client.get(&request).await?)
            }
            Backend::Local(local) => {
                CommandOutput::Text(local.info(self.file_id.as_ref().map(|(_, id)| *id))?)
            }
        };
        Ok(output)
    }
}
