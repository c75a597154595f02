use serde::Deserialize;

use super::client::ArmClient;

const SUBSCRIPTION_API_VERSION: &str = "2022-12-01";

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    #[serde(rename = "subscriptionId")]
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub state: Option<String>,
}

/// Outcome of the subscription login check. Hard denials and transient
/// failures are kept apart so callers can tell "log in again" from
/// "retry later".
#[derive(Debug)]
pub enum SubscriptionAccess {
    Authorized(Subscription),
    Unauthorized { message: String },
    Transient { message: String },
}

impl SubscriptionAccess {
    pub fn is_authorized(&self) -> bool {
        matches!(self, SubscriptionAccess::Authorized(_))
    }
}

impl ArmClient {
    /// Single read-only lookup of the client's subscription.
    pub async fn check_subscription(&self) -> SubscriptionAccess {
        let path = format!(
            "/subscriptions/{}?api-version={}",
            self.subscription_id(),
            SUBSCRIPTION_API_VERSION
        );

        match self.get_json::<Subscription>(&path).await {
            Ok(sub) => SubscriptionAccess::Authorized(sub),
            Err(err) => match err.status() {
                Some(status) if !is_transient_status(status) => SubscriptionAccess::Unauthorized {
                    message: err.to_string(),
                },
                // 408/429/5xx, transport failures, malformed bodies
                _ => SubscriptionAccess::Transient {
                    message: err.to_string(),
                },
            },
        }
    }
}

/// Statuses where a retry could plausibly succeed. Everything else from
/// ARM (401/403/404 included) is treated as a hard denial of the
/// subscription lookup.
fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || status >= 500
}
