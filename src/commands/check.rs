use crate::api::models::{RemoteRequest, Route};
use crate::backend::Backend;
use crate::commands::CommandOutput;
use crate::error::Error;

pub async fn run(backend: &Backend) -> Result<CommandOutput, Error> {
    let output = match backend {
        Backend::Remote(client) => {
            CommandOutput::Raw(client.get(&RemoteRequest::new(Route::Check)).await?)
        }
        Backend::Local(local) => CommandOutput::Text(local.check()?),
    };
    Ok(output)
}
