use crate::demo::{run_batch, run_demo, run_screen, BatchArgs, DemoArgs, ScreenArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use disease_screen::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "disease-screen-api",
    about = "Validate clinical inputs and score heart disease, diabetes, and pneumonia risk",
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
    /// Validate and score a single submission given as FIELD=VALUE pairs
    Screen(ScreenArgs),
    /// Screen every row of a CSV file whose header names the fields
    Batch(BatchArgs),
    /// Run sample patients through an in-memory service and print the stored history
    Demo(DemoArgs),
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
        Command::Screen(args) => run_screen(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}
