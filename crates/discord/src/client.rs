use std::time::Duration;

use async_trait::async_trait;
use inhouse_core::config::DiscordConfig;
use inhouse_core::domain::player::UserId;
use inhouse_core::errors::{LookupError, NotifyError};
use inhouse_core::pipeline::{FollowupNotifier, FollowupTarget, UserDirectory};
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// REST client for the handful of Discord endpoints the bot calls.
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base_url: String,
    bot_token: SecretString,
}

#[derive(Deserialize)]
struct UserPayload {
    username: String,
}

#[derive(Serialize)]
struct FollowupBody<'a> {
    content: &'a str,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_http(http, &config.api_base_url, config.bot_token.clone()))
    }

    pub fn with_http(http: Client, api_base_url: &str, bot_token: SecretString) -> Self {
        Self { http, api_base_url: api_base_url.trim_end_matches('/').to_owned(), bot_token }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn authorized(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Authorization", format!("Bot {}", self.bot_token.expose_secret()))
    }
}

#[async_trait]
impl UserDirectory for DiscordClient {
    async fn display_name(&self, user_id: &UserId) -> Result<String, LookupError> {
        let response = self
            .authorized(Method::GET, &format!("users/{user_id}"))
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LookupError::Timeout
                } else {
                    LookupError::Transport(error.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LookupError::Status { status: response.status().as_u16() });
        }

        let payload: UserPayload =
            response.json().await.map_err(|error| LookupError::Decode(error.to_string()))?;
        debug!(event_name = "discord.user_resolved", user_id = %user_id, "resolved username");
        Ok(payload.username)
    }
}

#[async_trait]
impl FollowupNotifier for DiscordClient {
    async fn deliver(&self, target: &FollowupTarget, content: &str) -> Result<(), NotifyError> {
        let path =
            format!("webhooks/{}/{}/messages/@original", target.application_id, target.token);
        let response = self
            .http
            .patch(self.url(&path))
            .json(&FollowupBody { content })
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Transport(error.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(NotifyError::Status { status: response.status().as_u16() });
        }
        Ok(())
    }
}
