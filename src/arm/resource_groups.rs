use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::client::ArmClient;
use super::error::ArmError;

const RESOURCE_GROUP_API_VERSION: &str = "2021-04-01";

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    properties: Option<ResourceGroupProperties>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResourceGroupProperties {
    #[serde(rename = "provisioningState")]
    provisioning_state: Option<String>,
}

impl ResourceGroup {
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }
}

#[derive(Serialize)]
struct CreateResourceGroupRequest<'a> {
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct ResourceGroupPage {
    #[serde(default)]
    value: Vec<ResourceGroup>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// Lazy page sequence over the subscription's resource groups.
/// Restartable: a fresh pager from [`ArmClient::resource_group_pager`]
/// begins at the first page again.
pub struct ResourceGroupPager<'a> {
    client: &'a ArmClient,
    next_link: Option<String>,
    exhausted: bool,
}

impl<'a> ResourceGroupPager<'a> {
    fn new(client: &'a ArmClient) -> Self {
        Self {
            client,
            next_link: None,
            exhausted: false,
        }
    }

    /// Fetch the next page, or `None` once every page has been served.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ResourceGroup>>, ArmError> {
        if self.exhausted {
            return Ok(None);
        }

        let result: Result<ResourceGroupPage, ArmError> = match self.next_link.as_deref() {
            Some(link) => self.client.get_next(link).await,
            None => {
                self.client
                    .get_json(&list_path(self.client.subscription_id()))
                    .await
            }
        };

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                // A failed pager must not rewind to the first page and
                // hand out duplicates; it ends here. Restart with a
                // fresh pager instead.
                self.exhausted = true;
                self.next_link = None;
                return Err(err);
            }
        };

        self.next_link = page.next_link;
        if self.next_link.is_none() {
            self.exhausted = true;
        }
        Ok(Some(page.value))
    }
}

fn list_path(subscription_id: &str) -> String {
    format!(
        "/subscriptions/{}/resourcegroups?api-version={}",
        subscription_id, RESOURCE_GROUP_API_VERSION
    )
}

fn group_path(subscription_id: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourcegroups/{}?api-version={}",
        subscription_id, name, RESOURCE_GROUP_API_VERSION
    )
}

impl ArmClient {
    /// Fetch a resource group by name.
    pub async fn get_resource_group(&self, name: &str) -> Result<ResourceGroup, ArmError> {
        let path = group_path(self.subscription_id(), name);
        match self.get_json(&path).await {
            Err(ArmError::Api { status: 404, .. }) => Err(ArmError::NotFound(name.to_string())),
            other => other,
        }
    }

    /// Lazy pager over all resource groups in the subscription.
    pub fn resource_group_pager(&self) -> ResourceGroupPager<'_> {
        ResourceGroupPager::new(self)
    }

    /// Every resource group in the subscription, all pages drained,
    /// provider order preserved.
    pub async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>, ArmError> {
        let mut pager = self.resource_group_pager();
        let mut groups = Vec::new();
        while let Some(page) = pager.next_page().await? {
            groups.extend(page);
        }
        Ok(groups)
    }

    /// Check-existence call. Any 2xx means the group exists, 404 means
    /// it does not; other statuses are errors.
    pub async fn resource_group_exists(&self, name: &str) -> Result<bool, ArmError> {
        let path = group_path(self.subscription_id(), name);
        let status = self.head(&path).await?;
        if status.is_success() {
            return Ok(true);
        }
        match status.as_u16() {
            404 => Ok(false),
            other => Err(ArmError::Api {
                method: "HEAD",
                path,
                status: other,
                code: "UnknownError".to_string(),
                message: "unexpected status for existence check".to_string(),
            }),
        }
    }

    /// Create the group, or update it in place if it already exists.
    /// Idempotent per ARM's own contract: repeating the call with the
    /// same name and location converges on the same remote state.
    pub async fn create_resource_group(
        &self,
        name: &str,
        location: &str,
        tags: Option<&BTreeMap<String, String>>,
    ) -> Result<ResourceGroup, ArmError> {
        let path = group_path(self.subscription_id(), name);
        self.put_json(&path, &CreateResourceGroupRequest { location, tags })
            .await
    }
}
