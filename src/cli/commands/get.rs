use anyhow::Result;

use super::login;
use crate::cli::GetArgs;

pub async fn execute_get(args: GetArgs) -> Result<()> {
    let (client, _) = login(&args.conn).await?;

    let group = client.get_resource_group(&args.name).await?;

    println!("Name:     {}", group.name);
    println!("Location: {}", group.location);
    println!("Id:       {}", group.id);
    if let Some(state) = group.provisioning_state() {
        println!("State:    {}", state);
    }
    if let Some(tags) = &group.tags {
        if !tags.is_empty() {
            println!("Tags:");
            for (key, value) in tags {
                println!("    {} = {}", key, value);
            }
        }
    }

    Ok(())
}
