use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use console::style;

use super::login;
use crate::cli::CreateArgs;

const DEFAULT_LOCATION: &str = "australiaeast";

pub async fn execute_create(args: CreateArgs) -> Result<()> {
    let (client, cfg) = login(&args.conn).await?;

    let location = args
        .location
        .or(cfg.location)
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let tags = parse_tags(&args.tags)?;

    eprintln!("==> Creating resource group: {} ({})", args.name, location);
    let group = client
        .create_resource_group(&args.name, &location, tags.as_ref())
        .await
        .with_context(|| format!("creation of resource group '{}' failed", args.name))?;

    println!(
        "{}",
        style(format!("Resource group {} created", group.id)).yellow()
    );

    Ok(())
}

fn parse_tags(raw: &[String]) -> Result<Option<BTreeMap<String, String>>> {
    if raw.is_empty() {
        return Ok(None);
    }

    let mut tags = BTreeMap::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid tag '{}', expected KEY=VALUE", pair);
        };
        if key.is_empty() {
            bail!("invalid tag '{}', key must not be empty", pair);
        }
        tags.insert(key.to_string(), value.to_string());
    }
    Ok(Some(tags))
}
