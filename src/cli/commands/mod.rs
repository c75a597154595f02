mod create;
mod exists;
mod get;
mod list;

pub use create::execute_create;
pub use exists::execute_exists;
pub use get::execute_get;
pub use list::execute_list;

use anyhow::{bail, Result};
use console::style;

use crate::arm::{resolve_credential, ArmClient, SubscriptionAccess};
use crate::cli::config::RunConfig;
use crate::cli::ConnectionArgs;

/// Resolve a credential, build the ARM client and confirm the
/// subscription is reachable. Every subcommand funnels through here, so
/// a run that is not logged in fails before any resource-group call.
pub(crate) async fn login(conn: &ConnectionArgs) -> Result<(ArmClient, RunConfig)> {
    let cfg = RunConfig::resolve(conn.subscription.clone(), conn.endpoint.clone())?;

    eprintln!("==> Resolving credentials...");
    let cred = resolve_credential().await?;
    eprintln!("    Credential source: {}", cred.source());

    let client = ArmClient::new(&cred, &cfg.subscription_id, &cfg.endpoint)?;

    match client.check_subscription().await {
        SubscriptionAccess::Authorized(sub) => {
            if let Some(name) = sub.display_name.as_deref() {
                eprintln!("    Subscription: {}", name);
            }
            println!(
                "{}",
                style(format!(
                    "Logged into subscription: {}",
                    client.subscription_id()
                ))
                .yellow()
            );
        }
        SubscriptionAccess::Unauthorized { message } => bail!(
            "you are not logged into the azure subscription '{}', \
             please login and retry operation ({})",
            cfg.subscription_id,
            message
        ),
        SubscriptionAccess::Transient { message } => bail!(
            "subscription check for '{}' failed with a transient error, \
             retrying may succeed: {}",
            cfg.subscription_id,
            message
        ),
    }

    Ok((client, cfg))
}
