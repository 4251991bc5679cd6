use clap::{CommandFactory, Parser};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use fvclient::commands::{Command, CommandRequest, COMMANDS_HELP};
use fvclient::{config, Error};

#[derive(Parser)]
#[command(name = "fvclient", version)]
#[command(
    about = "Filevault command line client",
    long_about = r#"
        Filevault client. Depending on its configuration it either talks to a
        remote vault server over authenticated HTTP(S), or opens the vault
        database and file store directly.
    "#,
    override_usage = "fvclient [--config=<FILE>] <command> [arguments]",
    after_help = COMMANDS_HELP
)]
struct Cli {
    /// Override the default config file
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    command: Option<String>,

    args: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n ** ERROR: {}\n", e);
            if e.wants_usage() {
                let _ = Cli::command().print_help();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    // arguments are checked before the config is read or anything is opened
    let request = CommandRequest::new(cli.command.clone().ok_or(Error::Usage)?, cli.args.clone());
    let command = Command::parse(&request)?;

    let backend = config::resolve(cli.config.as_deref())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let output = rt.block_on(command.run(&backend))?;
    let mut stdout = std::io::stdout().lock();
    output.write_to(&mut stdout)?;
    stdout.flush()?;
    Ok(())
}
