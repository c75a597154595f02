use anyhow::Result;

use super::login;
use crate::cli::ListArgs;

pub async fn execute_list(args: ListArgs) -> Result<()> {
    let (client, _) = login(&args.conn).await?;

    let groups = client.list_resource_groups().await?;

    if groups.is_empty() {
        println!(
            "No resource groups in subscription {}",
            client.subscription_id()
        );
        return Ok(());
    }

    for group in &groups {
        println!("{}\t{}", group.name, group.location);
    }
    eprintln!("    {} resource group(s)", groups.len());

    Ok(())
}
