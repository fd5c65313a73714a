use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::VkCredentials;
use crate::models::{RawPost, ResolvedGroupMetadata};
use crate::pipeline::SocialNetwork;

const API_BASE: &str = "https://api.vk.com/method";
const OAUTH_URL: &str = "https://oauth.vk.com/token";
const USER_AGENT: &str = "week-events/0.1";

#[derive(Debug, Error)]
pub enum VkError {
    #[error("http error: {0}")]
    Http(String),
    #[error("vk api error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("login rejected: {0}")]
    Auth(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Granted {
        access_token: String,
    },
    Rejected {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct WallResponse {
    #[serde(default)]
    items: Vec<RawPost>,
}

// Older API versions return a bare array, 5.139+ wraps it in `groups`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupsResponse {
    List(Vec<ResolvedGroupMetadata>),
    Wrapped { groups: Vec<ResolvedGroupMetadata> },
}

impl From<GroupsResponse> for Vec<ResolvedGroupMetadata> {
    fn from(value: GroupsResponse) -> Self {
        match value {
            GroupsResponse::List(groups) | GroupsResponse::Wrapped { groups } => groups,
        }
    }
}

pub struct VkClient {
    client: Client,
    token: String,
    api_version: String,
}

impl VkClient {
    /// Logs in with the configured credentials, or reuses a pre-issued token.
    pub fn authorize(
        credentials: &VkCredentials,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, VkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| VkError::Http(err.to_string()))?;

        let token = match credentials
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            Some(token) => {
                tracing::debug!("using pre-issued vk access token");
                token.to_string()
            }
            None => password_login(&client, credentials, api_version)?,
        };

        Ok(Self {
            client,
            token,
            api_version: api_version.to_string(),
        })
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, VkError> {
        let url = format!("{API_BASE}/{method}");
        let mut form: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        form.push(("access_token", self.token.as_str()));
        form.push(("v", self.api_version.as_str()));

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .map_err(|err| VkError::Http(format!("{method}: {err}")))?;
        let response = response
            .error_for_status()
            .map_err(|err| VkError::Http(format!("{method}: {err}")))?;
        let body = response
            .text()
            .map_err(|err| VkError::Http(format!("{method}: {err}")))?;
        decode_envelope(&body)
    }
}

impl SocialNetwork for VkClient {
    fn get_posts(&self, owner_id: i64, count: u32) -> Result<Vec<RawPost>, VkError> {
        let wall: WallResponse = self.call(
            "wall.get",
            &[
                ("owner_id", owner_id.to_string()),
                ("count", count.to_string()),
            ],
        )?;
        Ok(wall.items)
    }

    fn get_groups_by_id(
        &self,
        ids: &[String],
        fields: &[&str],
    ) -> Result<Vec<ResolvedGroupMetadata>, VkError> {
        let groups: GroupsResponse = self.call(
            "groups.getById",
            &[("group_ids", ids.join(",")), ("fields", fields.join(","))],
        )?;
        Ok(groups.into())
    }
}

fn password_login(
    client: &Client,
    credentials: &VkCredentials,
    api_version: &str,
) -> Result<String, VkError> {
    let mut params: Vec<(&str, &str)> = vec![
        ("grant_type", "password"),
        ("client_id", credentials.app_id.as_str()),
        ("username", credentials.login.as_str()),
        ("password", credentials.password.as_str()),
        ("scope", "wall,groups"),
        ("v", api_version),
    ];
    if let Some(secret) = credentials.client_secret.as_deref() {
        params.push(("client_secret", secret));
    }

    // Rejections come back as 4xx with a JSON body, so the status is not checked here.
    // The query carries the password, keep it out of error messages.
    let body = client
        .get(OAUTH_URL)
        .query(&params)
        .send()
        .and_then(|response| response.text())
        .map_err(|err| VkError::Http(format!("oauth: {}", err.without_url())))?;
    decode_token(&body)
}

fn decode_token(body: &str) -> Result<String, VkError> {
    match serde_json::from_str::<TokenResponse>(body) {
        Ok(TokenResponse::Granted { access_token }) => Ok(access_token),
        Ok(TokenResponse::Rejected {
            error,
            error_description,
        }) => Err(VkError::Auth(match error_description {
            Some(description) => format!("{error}: {description}"),
            None => error,
        })),
        Err(err) => Err(VkError::Parse(format!("oauth response: {err}"))),
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, VkError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|err| VkError::Parse(err.to_string()))?;
    if let Some(error) = envelope.error {
        return Err(VkError::Api {
            code: error.error_code,
            message: error.error_msg,
        });
    }
    envelope
        .response
        .ok_or_else(|| VkError::Parse("response field missing".into()))
}
