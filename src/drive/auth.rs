use super::ensure_success;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::debug;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Anything that can hand out a bearer token for the drive API.
#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    async fn access_token(&self, http: &reqwest::Client) -> Result<String>;
}

/// OAuth client plus refresh token, the "authorized_user" credential file
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    TOKEN_URL.to_string()
}

/// A service account key file, signed into a token by `yup-oauth2`
#[derive(Clone)]
pub struct ServiceAccount {
    key: ServiceAccountKey,
}

impl ServiceAccount {
    pub fn from_json(json: &str) -> Result<Self> {
        let key = yup_oauth2::parse_service_account_key(json)?;
        Ok(ServiceAccount { key })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }
}

#[derive(Clone)]
pub enum Credentials {
    /// A token minted elsewhere, for a user or a service account
    AccessToken(String),
    AuthorizedUser(AuthorizedUser),
    ServiceAccount(ServiceAccount),
    /// The service account attached to the machine we run on
    MetadataServer,
}

// Secrets stay out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(..)"),
            Credentials::AuthorizedUser(user) => f
                .debug_struct("AuthorizedUser")
                .field("client_id", &user.client_id)
                .finish_non_exhaustive(),
            Credentials::ServiceAccount(account) => f
                .debug_struct("ServiceAccount")
                .field("client_email", &account.client_email())
                .finish_non_exhaustive(),
            Credentials::MetadataServer => f.write_str("MetadataServer"),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl Credentials {
    /// Parse a credential JSON document by its "type" field
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value.get("type").and_then(|t| t.as_str()) {
            Some("authorized_user") => Ok(Credentials::AuthorizedUser(
                serde_json::from_value(value)?,
            )),
            Some("service_account") => Ok(Credentials::ServiceAccount(
                ServiceAccount::from_json(json)?,
            )),
            Some(other) => Err(Error::UnsupportedCredentials(format!(
                "credential type {:?}",
                other
            ))),
            None => Err(Error::UnsupportedCredentials(
                "credential JSON has no \"type\" field".to_string(),
            )),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl AuthProvider for Credentials {
    async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        match self {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::AuthorizedUser(user) => user.access_token(http).await,
            Credentials::ServiceAccount(account) => account.access_token(http).await,
            Credentials::MetadataServer => metadata_token(http, METADATA_TOKEN_URL).await,
        }
    }
}

impl AuthProvider for AuthorizedUser {
    async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        debug!("Refreshing access token for client {}", self.client_id);
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = http.post(&self.token_uri).form(&params).send().await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;
        debug!("Got access token, expires in {:?}s", token.expires_in);
        Ok(token.access_token)
    }
}

impl AuthProvider for ServiceAccount {
    async fn access_token(&self, _http: &reqwest::Client) -> Result<String> {
        debug!("Signing token request for service account {}", self.client_email());
        let auth = ServiceAccountAuthenticator::builder(self.key.clone())
            .build()
            .await?;
        let token = auth.token(&[DRIVE_SCOPE]).await?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| {
                Error::UnsupportedCredentials(format!(
                    "no access token issued for {}",
                    self.client_email()
                ))
            })
    }
}

async fn metadata_token(http: &reqwest::Client, url: &str) -> Result<String> {
    debug!("Requesting access token from metadata server");
    let response = http
        .get(url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await?;
    let token: TokenResponse = ensure_success(response).await?.json().await?;
    Ok(token.access_token)
}
