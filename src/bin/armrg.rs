use clap::Parser;

use armrg::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    armrg::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create(args) => commands::execute_create(args).await?,
        Commands::Get(args) => commands::execute_get(args).await?,
        Commands::List(args) => commands::execute_list(args).await?,
        Commands::Exists(args) => commands::execute_exists(args).await?,
    }

    Ok(())
}
