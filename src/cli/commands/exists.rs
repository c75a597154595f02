use anyhow::Result;

use super::login;
use crate::cli::ExistsArgs;

pub async fn execute_exists(args: ExistsArgs) -> Result<()> {
    let (client, _) = login(&args.conn).await?;

    if client.resource_group_exists(&args.name).await? {
        println!("Resource group '{}' exists", args.name);
    } else {
        println!("Resource group '{}' does not exist", args.name);
    }

    Ok(())
}
