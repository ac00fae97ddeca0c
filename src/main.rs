use anyhow::Result;
use clap::Parser;
use smseagle_notify::{cli::Cli, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
