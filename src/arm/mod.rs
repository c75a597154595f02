pub mod auth;
pub mod client;
mod error;
pub mod resource_groups;
pub mod subscriptions;

pub use auth::{resolve_credential, Credential, CredentialSource};
pub use client::{ArmClient, MANAGEMENT_ENDPOINT};
pub use error::{ArmError, AuthError};
pub use resource_groups::{ResourceGroup, ResourceGroupPager};
pub use subscriptions::{Subscription, SubscriptionAccess};
