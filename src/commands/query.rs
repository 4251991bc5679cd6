use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::CommandOutput;
use crate::error::Error;

/// `query <terms>...`: files matching every term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Each term followed by one space, trailing space included. The server
    /// signs the same string, so it must not be trimmed.
    pub terms: String,
}

impl Query {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        if args.is_empty() {
            return Err(Error::invalid_argument("No query terms specified."));
        }
        let terms = args.iter().map(|term| format!("{} ", term)).collect();
        Ok(Self { terms })
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        let output = match backend {
            Backend::Remote(client) => {
                let request = RemoteRequest::with_subject(Route::Query, &self.terms)
                    .param("t", self.terms.as_str());
                CommandOutput::Raw(client.get(&request).await?)
            }
            Backend::Local(local) => CommandOutput::Text(local.query(&self.terms)?),
        };
        Ok(output)
    }
}
