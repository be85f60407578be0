use clap::Parser;
use tinylink_gateway::{server, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::try_parse()?;
    tinylink_telemetry::init(cli.log_format.into())?;

    server::run(cli).await
}
