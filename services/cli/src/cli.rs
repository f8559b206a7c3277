use crate::infra::{run_validate, ValidateArgs};
use crate::server;
use crate::walkthrough::{run_walkthrough, WalkthroughArgs};
use clap::{Args, Parser, Subcommand};
use expert_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Expert Intake",
    about = "Run the expert application sandbox and drive the wizard from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the in-memory expert applications API (default command)
    Sandbox(ServeArgs),
    /// Walk a scripted applicant through every wizard step and submit
    Walkthrough(WalkthroughArgs),
    /// Check a saved draft or snapshot against every step's rules
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the sandbox server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the sandbox server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Sandbox(ServeArgs::default()));

    match command {
        Command::Sandbox(args) => server::run(args).await,
        Command::Walkthrough(args) => run_walkthrough(args).await,
        Command::Validate(args) => run_validate(args),
    }
}
