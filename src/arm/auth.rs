use std::env;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use super::error::AuthError;

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

// IMDS is a link-local endpoint; off Azure the connection hangs, so the
// probe gets a short timeout to keep the chain responsive.
const IMDS_TIMEOUT: Duration = Duration::from_secs(3);

/// A resolved bearer credential for ARM calls. Lives for one run,
/// never persisted.
pub struct Credential {
    token: String,
    source: CredentialSource,
}

/// Which strategy in the chain produced the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    StaticToken,
    ServicePrincipal,
    AzureCli,
    ManagedIdentity,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialSource::StaticToken => "static token (AZURE_ACCESS_TOKEN)",
            CredentialSource::ServicePrincipal => "service principal",
            CredentialSource::AzureCli => "az CLI",
            CredentialSource::ManagedIdentity => "managed identity",
        };
        f.write_str(name)
    }
}

impl Credential {
    /// Wrap a pre-acquired bearer token.
    pub fn from_static(token: impl Into<String>) -> Self {
        Credential {
            token: token.into(),
            source: CredentialSource::StaticToken,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

/// Resolve a credential from the ambient environment, trying in order:
/// AZURE_ACCESS_TOKEN, service principal env vars, az CLI login state,
/// IMDS managed identity. The first usable credential wins; if every
/// strategy fails the error lists each strategy's reason.
pub async fn resolve_credential() -> Result<Credential, AuthError> {
    let http = reqwest::Client::new();
    let mut failures = Vec::new();

    match from_env_token() {
        Ok(cred) => return Ok(cred),
        Err(e) => failures.push(format!("  - {}", e)),
    }

    match from_service_principal(&http).await {
        Ok(cred) => return Ok(cred),
        Err(e) => failures.push(format!("  - {}", e)),
    }

    match from_az_cli().await {
        Ok(cred) => return Ok(cred),
        Err(e) => failures.push(format!("  - {}", e)),
    }

    match from_managed_identity(&http).await {
        Ok(cred) => return Ok(cred),
        Err(e) => failures.push(format!("  - {}", e)),
    }

    Err(AuthError::ChainExhausted(failures.join("\n")))
}

fn from_env_token() -> Result<Credential, AuthError> {
    match env::var("AZURE_ACCESS_TOKEN") {
        Ok(token) if !token.trim().is_empty() => {
            tracing::debug!("using pre-acquired token from AZURE_ACCESS_TOKEN");
            Ok(Credential::from_static(token))
        }
        Ok(_) => Err(AuthError::strategy("AZURE_ACCESS_TOKEN", "set but empty")),
        Err(_) => Err(AuthError::strategy("AZURE_ACCESS_TOKEN", "not set")),
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error_description: Option<String>,
    error: Option<String>,
}

/// OAuth2 client-credentials grant against the tenant's token endpoint.
async fn from_service_principal(http: &reqwest::Client) -> Result<Credential, AuthError> {
    const STRATEGY: &str = "service principal";

    let (tenant, client_id, secret) = match (
        env::var("AZURE_TENANT_ID"),
        env::var("AZURE_CLIENT_ID"),
        env::var("AZURE_CLIENT_SECRET"),
    ) {
        (Ok(t), Ok(c), Ok(s)) => (t, c, s),
        _ => {
            return Err(AuthError::strategy(
                STRATEGY,
                "AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET are not all set",
            ))
        }
    };

    let authority =
        env::var("AZURE_AUTHORITY_HOST").unwrap_or_else(|_| DEFAULT_AUTHORITY_HOST.to_string());
    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        authority.trim_end_matches('/'),
        tenant
    );
    tracing::debug!(%url, "requesting service principal token");

    let resp = http
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", secret.as_str()),
            ("scope", MANAGEMENT_SCOPE),
        ])
        .send()
        .await
        .map_err(|e| AuthError::strategy(STRATEGY, format!("token request failed: {}", e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let detail = resp
            .json::<TokenErrorResponse>()
            .await
            .ok()
            .and_then(|e| e.error_description.or(e.error))
            .unwrap_or_else(|| "no error detail".to_string());
        return Err(AuthError::strategy(
            STRATEGY,
            format!("token endpoint returned {}: {}", status, detail),
        ));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| AuthError::strategy(STRATEGY, format!("malformed token response: {}", e)))?;

    Ok(Credential {
        token: token.access_token,
        source: CredentialSource::ServicePrincipal,
    })
}

#[derive(Deserialize)]
struct AzCliToken {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "expiresOn")]
    expires_on: Option<String>,
}

/// Reuse the local `az login` session by shelling out to the az CLI.
async fn from_az_cli() -> Result<Credential, AuthError> {
    const STRATEGY: &str = "az CLI";

    let output = Command::new("az")
        .args(["account", "get-access-token", "--output", "json"])
        .output()
        .await
        .map_err(|e| AuthError::strategy(STRATEGY, format!("failed to run az: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr.lines().next().unwrap_or("az exited with an error");
        return Err(AuthError::strategy(STRATEGY, reason.to_string()));
    }

    let token = parse_az_token(&String::from_utf8_lossy(&output.stdout))?;

    if let Some(ref exp) = token.expires_on {
        if az_token_expired(exp) {
            eprintln!("Warning: az CLI token may be expired ({})", exp);
            eprintln!("Run 'az login' to refresh");
        }
    }

    tracing::debug!("using az CLI login session");
    Ok(Credential {
        token: token.access_token,
        source: CredentialSource::AzureCli,
    })
}

fn parse_az_token(stdout: &str) -> Result<AzCliToken, AuthError> {
    serde_json::from_str(stdout)
        .map_err(|e| AuthError::strategy("az CLI", format!("malformed token output: {}", e)))
}

/// az prints expiresOn as a naive local timestamp, e.g.
/// "2024-05-20 12:34:56.123456".
fn az_token_expired(expires_on: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(expires_on, "%Y-%m-%d %H:%M:%S%.f")
        .map(|exp| exp < chrono::Local::now().naive_local())
        .unwrap_or(false)
}

/// Instance Metadata Service token for VMs with a managed identity.
async fn from_managed_identity(http: &reqwest::Client) -> Result<Credential, AuthError> {
    const STRATEGY: &str = "managed identity";

    let endpoint =
        env::var("IDENTITY_ENDPOINT").unwrap_or_else(|_| DEFAULT_IMDS_ENDPOINT.to_string());
    tracing::debug!(%endpoint, "probing managed identity endpoint");

    let resp = http
        .get(&endpoint)
        .query(&[
            ("api-version", "2018-02-01"),
            ("resource", MANAGEMENT_RESOURCE),
        ])
        .header("Metadata", "true")
        .timeout(IMDS_TIMEOUT)
        .send()
        .await
        .map_err(|e| AuthError::strategy(STRATEGY, format!("IMDS unreachable: {}", e)))?;

    if !resp.status().is_success() {
        return Err(AuthError::strategy(
            STRATEGY,
            format!("IMDS returned {}", resp.status()),
        ));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| AuthError::strategy(STRATEGY, format!("malformed IMDS response: {}", e)))?;

    Ok(Credential {
        token: token.access_token,
        source: CredentialSource::ManagedIdentity,
    })
}
