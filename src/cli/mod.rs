pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "armrg")]
#[command(about = "Provision Azure resource groups")]
#[command(version = crate::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a resource group (or update it in place)
    Create(CreateArgs),
    /// Show a resource group
    Get(GetArgs),
    /// List every resource group in the subscription
    List(ListArgs),
    /// Check whether a resource group exists
    Exists(ExistsArgs),
}

/// Args shared by every subcommand: which subscription to talk to and
/// which management endpoint to use.
#[derive(clap::Args)]
pub struct ConnectionArgs {
    /// Subscription id (falls back to .armrg.toml, then the az profile)
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Management endpoint override (sovereign clouds, tests)
    #[arg(long, env = "ARM_ENDPOINT", hide = true)]
    pub endpoint: Option<String>,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Resource group name
    pub name: String,

    /// Azure region for the group (falls back to .armrg.toml)
    #[arg(long, env = "AZURE_LOCATION")]
    pub location: Option<String>,

    /// Tags applied to the group (repeatable)
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    pub tags: Vec<String>,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(clap::Args)]
pub struct GetArgs {
    /// Resource group name
    pub name: String,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(clap::Args)]
pub struct ExistsArgs {
    /// Resource group name
    pub name: String,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}
