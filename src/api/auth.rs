use anyhow::{anyhow, Context, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, Auth};
use crate::config::{AuthType, PortalConfig};

const ACCESS_TOKEN_PATH: &str = "localdevauth/v1/auth/refresh";

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    #[serde(rename = "encodedOAuthRefreshToken")]
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub oauth_access_token: String,
    #[serde(default)]
    pub expires_at_millis: Option<u64>,
}

/// Exchange a personal access key for a short-lived access token.
pub fn fetch_access_token(client: &ApiClient, personal_access_key: &str) -> Result<AccessToken> {
    let body = AccessTokenRequest {
        refresh_token: personal_access_key,
    };
    let response = client
        .request(Method::POST, ACCESS_TOKEN_PATH, &Auth::None)
        .json(&body)
        .send()
        .context("Failed to request an access token")?
        .error_for_status()
        .context("The personal access key was rejected")?;
    response
        .json::<AccessToken>()
        .context("Failed to parse the access token response")
}

/// Credentials to send with requests made on behalf of `portal`.
pub fn authenticate(client: &ApiClient, portal: &PortalConfig) -> Result<Auth> {
    match portal.auth_type {
        AuthType::ApiKey => portal
            .api_key
            .clone()
            .map(Auth::ApiKey)
            .ok_or_else(|| anyhow!("portal {} is missing \"api_key\"", portal.label())),
        AuthType::PersonalAccessKey => {
            let key = portal.personal_access_key.as_deref().ok_or_else(|| {
                anyhow!(
                    "portal {} is missing \"personal_access_key\"",
                    portal.label()
                )
            })?;
            let token = fetch_access_token(client, key)?;
            tracing::debug!(
                portal_id = portal.id(),
                expires_at_millis = ?token.expires_at_millis,
                "obtained access token"
            );
            Ok(Auth::Bearer(token.oauth_access_token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Env};

    fn portal(auth_type: AuthType) -> PortalConfig {
        PortalConfig {
            name: Some("prod".to_string()),
            portal_id: Some(123),
            auth_type,
            api_key: None,
            personal_access_key: None,
            env: Env::Prod,
        }
    }

    #[test]
    fn test_request_body_field_name() {
        let body = AccessTokenRequest {
            refresh_token: "pak",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"encodedOAuthRefreshToken":"pak"}"#
        );
    }

    #[test]
    fn test_access_token_response() {
        let token: AccessToken = serde_json::from_str(
            r#"{"oauthAccessToken":"abc","expiresAtMillis":1700000000000,"portalId":123}"#,
        )
        .unwrap();
        assert_eq!(token.oauth_access_token, "abc");
        assert_eq!(token.expires_at_millis, Some(1_700_000_000_000));
    }

    #[test]
    fn test_api_key_auth_needs_no_request() {
        let client = ApiClient::new(&Config::default(), Env::Prod).unwrap();
        let mut p = portal(AuthType::ApiKey);
        p.api_key = Some("secret".to_string());
        assert!(matches!(authenticate(&client, &p).unwrap(), Auth::ApiKey(k) if k == "secret"));
    }

    #[test]
    fn test_missing_credentials_are_errors() {
        let client = ApiClient::new(&Config::default(), Env::Prod).unwrap();
        let err = authenticate(&client, &portal(AuthType::ApiKey)).unwrap_err();
        assert!(err.to_string().contains("missing \"api_key\""));
        let err = authenticate(&client, &portal(AuthType::PersonalAccessKey)).unwrap_err();
        assert!(err.to_string().contains("missing \"personal_access_key\""));
    }
}
