use clap::Parser;
use mediashelf_lib::{run_cli, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_cli(Cli::parse()).await
}
