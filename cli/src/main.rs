use clap::Parser;
use devdeck_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    devdeck_cli::logging::init();
    let cli = Cli::parse();
    devdeck_cli::run(cli).await
}
