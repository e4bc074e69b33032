use crate::demo::{run_demo, run_template, DemoArgs, TemplateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use landdesk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Land Company Back Office",
    about = "Run the guide roster back office or drive it from the command line",
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
    /// Emit the bulk import starter sheet
    Template(TemplateArgs),
    /// Run an end-to-end CLI demo covering signup, roster, import, and admin
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
        Command::Template(args) => run_template(args),
        Command::Demo(args) => run_demo(args),
    }
}
