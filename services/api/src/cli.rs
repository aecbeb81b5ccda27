use crate::demo::{run_demo, run_qualify, run_rates, QualifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use interchange::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Interchange Qualification Service",
    about = "Qualify card transactions for interchange tiers from the command line or over HTTP",
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
    /// Qualify one transaction or an array of transactions from a JSON file
    Qualify(QualifyArgs),
    /// Print the active rate table
    Rates,
    /// Walk through the reference qualification scenarios
    Demo,
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
        Command::Qualify(args) => run_qualify(args),
        Command::Rates => run_rates(),
        Command::Demo => run_demo(),
    }
}
