use clap::Parser;
use stackprep::app::{handle_fatal_error, init_logging, AppConfig};
use stackprep::cli::{execute_command, Cli};

// Stages run sequentially
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = AppConfig::new(cli.verbose);
    init_logging(&config);

    if let Err(e) = execute_command(&cli).await {
        handle_fatal_error(e, cli.verbose);
    }
}
