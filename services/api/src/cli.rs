use crate::commands::{run_companies, run_lookup, CompaniesArgs, LookupArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lucky_draw::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lucky Draw",
    about = "Serve the year-end lucky draw backend or query a roster from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Resolve the prize for one attendee against a roster file or URL
    Lookup(LookupArgs),
    /// Print the company dropdown a roster would produce
    Companies(CompaniesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Lookup(args) => run_lookup(args).await,
        Command::Companies(args) => run_companies(args).await,
    }
}
