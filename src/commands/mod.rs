pub mod check;
pub mod exist;
pub mod extract;
pub mod hash;
pub mod import;
pub mod info;
pub mod list;
pub mod query;


use std::io::{self, Write};
use std::path::PathBuf;

use crate::backend::Backend;
use crate::error::Error;

pub const COMMANDS_HELP: &str = "commands:
    check
    exist <filename>
    extract <file_id> <filename>
    hash <hash>
    import <file> [filename]
    info [file_id]
    list <path>
    query <terms>";

/// Command name and its positional arguments, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// A validated command, ready to run against either backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check,
    Exist(exist::Exist),
    Extract(extract::Extract),
    Hash(hash::Hash),
    Import(import::Import),
    Info(info::Info),
    List(list::List),
    Query(query::Query),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Rendered locally.
    Text(String),
    /// Server response body, passed through byte for byte.
    Raw(Vec<u8>),
    FileWritten { path: PathBuf, bytes: u64 },
}

impl CommandOutput {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            CommandOutput::Text(text) => out.write_all(text.as_bytes()),
            CommandOutput::Raw(body) => out.write_all(body),
            // downloads print nothing on success
            CommandOutput::FileWritten { path, bytes } => {
                log::info!("{} bytes written to {}", bytes, path.display());
                Ok(())
            }
        }
    }
}

impl Command {
    /// Checks the argument list. Nothing here touches the network or the vault.
    pub fn parse(request: &CommandRequest) -> Result<Self, Error> {
        let args = request.args.as_slice();
        match request.command.as_str() {
            "check" => Ok(Command::Check),
            "exist" => exist::Exist::parse(args).map(Command::Exist),
            "extract" => extract::Extract::parse(args).map(Command::Extract),
            "hash" => hash::Hash::parse(args).map(Command::Hash),
            "import" => import::Import::parse(args).map(Command::Import),
            "info" => info::Info::parse(args).map(Command::Info),
            "list" => list::List::parse(args).map(Command::List),
            "query" => query::Query::parse(args).map(Command::Query),
            _ => Err(Error::Usage),
        }
    }

    pub async fn run(&self, backend: &Backend) -> Result<CommandOutput, Error> {
        log::debug!("running {:?}", self);
        match self {
            Command::Check => check::run(backend).await,
            Command::Exist(cmd) => cmd.run(backend).await,
            Command::Extract(cmd) => cmd.run(backend).await,
            Command::Hash(cmd) => cmd.run(backend).await,
            Command::Import(cmd) => cmd.run(backend).await,
            Command::Info(cmd) => cmd.run(backend).await,
            Command::List(cmd) => cmd.run(backend).await,
            Command::Query(cmd) => cmd.run(backend).await,
        }
    }
}

fn required<'a>(args: &'a [String], index: usize, missing: &str) -> Result<&'a str, Error> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| Error::invalid_argument(missing))
}

// ids are positive integers; the raw text is what gets signed and sent
fn parse_file_id(raw: &str) -> Result<i64, Error> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::invalid_argument("Invalid file_id.")),
    }
}
