//! Xbox Live HTTP client.
//!
//! Async client using `reqwest` for the Microsoft account token endpoint,
//! the Xbox Live user and XSTS authorities, and the title hub.

use futures_util::future::BoxFuture;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::auth::{EntitlementApi, OwnedTitle, REDIRECT_URI, SCOPE, XstsToken};
use crate::error::AuthError;

const TOKEN_URL: &str = "https://login.live.com/oauth20_token.srf";
const USER_AUTH_URL: &str = "https://user.auth.xboxlive.com/user/authenticate";
const XSTS_URL: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
const TITLEHUB_URL: &str = "https://titlehub.xboxlive.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct XblResponse {
    token: String,
    display_claims: DisplayClaims,
}

#[derive(Debug, Deserialize)]
struct DisplayClaims {
    xui: Vec<UserClaims>,
}

#[derive(Debug, Deserialize)]
struct UserClaims {
    #[serde(default)]
    uhs: String,
    #[serde(default)]
    xid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleHistory {
    #[serde(default)]
    titles: Vec<TitleRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pfn: Option<String>,
    #[serde(default)]
    display_image: Option<String>,
}

/// Production [`EntitlementApi`].
pub struct LiveApi {
    http: reqwest::Client,
    titlehub_url: String,
}

impl LiveApi {
    pub fn new() -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| http_error("HTTP client", e))?;
        Ok(Self {
            http,
            titlehub_url: TITLEHUB_URL.to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(
        stage: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AuthError> {
        let resp = request.send().await.map_err(|e| http_error(stage, e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                stage,
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.bytes().await.map_err(|e| http_error(stage, e))?;
        serde_json::from_slice(&body).map_err(|e| AuthError::Response {
            stage,
            message: e.to_string(),
        })
    }
}

fn http_error(stage: &'static str, e: reqwest::Error) -> AuthError {
    AuthError::Http {
        stage,
        message: e.to_string(),
    }
}

/// `application/x-www-form-urlencoded` body.
fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, NON_ALPHANUMERIC),
                utf8_percent_encode(v, NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn first_claim<'a>(resp: &'a XblResponse, stage: &'static str) -> Result<&'a UserClaims, AuthError> {
    resp.display_claims.xui.first().ok_or(AuthError::Response {
        stage,
        message: "no user claims".into(),
    })
}

impl EntitlementApi for LiveApi {
    fn exchange_code<'a>(
        &'a self,
        client_id: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, Result<String, AuthError>> {
        Box::pin(async move {
            let body = form_body(&[
                ("client_id", client_id),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", REDIRECT_URI),
                ("scope", SCOPE),
            ]);
            let request = self
                .http
                .post(TOKEN_URL)
                .header(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                )
                .body(body);
            let resp: TokenResponse = Self::send("token endpoint", request).await?;
            Ok(resp.access_token)
        })
    }

    fn user_token<'a>(&'a self, access_token: &'a str) -> BoxFuture<'a, Result<String, AuthError>> {
        Box::pin(async move {
            let body = json!({
                "RelyingParty": "http://auth.xboxlive.com",
                "TokenType": "JWT",
                "Properties": {
                    "AuthMethod": "RPS",
                    "SiteName": "user.auth.xboxlive.com",
                    "RpsTicket": format!("d={access_token}"),
                }
            });
            let request = self
                .http
                .post(USER_AUTH_URL)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .json(&body);
            let resp: XblResponse = Self::send("Xbox Live user authentication", request).await?;
            Ok(resp.token)
        })
    }

    fn xsts_token<'a>(
        &'a self,
        user_token: &'a str,
    ) -> BoxFuture<'a, Result<XstsToken, AuthError>> {
        Box::pin(async move {
            const STAGE: &str = "XSTS authorization";
            let body = json!({
                "RelyingParty": "http://xboxlive.com",
                "TokenType": "JWT",
                "Properties": {
                    "SandboxId": "RETAIL",
                    "UserTokens": [user_token],
                }
            });
            let request = self
                .http
                .post(XSTS_URL)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .json(&body);
            let resp: XblResponse = Self::send(STAGE, request).await?;

            let claims = first_claim(&resp, STAGE)?;
            let xuid = claims.xid.clone().ok_or(AuthError::Response {
                stage: STAGE,
                message: "no xid claim".into(),
            })?;
            Ok(XstsToken {
                token: resp.token.clone(),
                user_hash: claims.uhs.clone(),
                xuid,
            })
        })
    }

    fn title_history<'a>(
        &'a self,
        xsts: &'a XstsToken,
    ) -> BoxFuture<'a, Result<Vec<OwnedTitle>, AuthError>> {
        Box::pin(async move {
            let url = format!(
                "{}/users/xuid({})/titles/titlehistory/decoration/Image,ProductId",
                self.titlehub_url, xsts.xuid
            );
            let auth = HeaderValue::from_str(&format!("XBL3.0 x={};{}", xsts.user_hash, xsts.token))
                .map_err(|e| AuthError::Response {
                    stage: "title hub",
                    message: e.to_string(),
                })?;
            let request = self
                .http
                .get(&url)
                .header(AUTHORIZATION, auth)
                .header("x-xbl-contract-version", HeaderValue::from_static("2"))
                .header(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
            let history: TitleHistory = Self::send("title hub", request).await?;

            let titles: Vec<OwnedTitle> = history
                .titles
                .into_iter()
                .filter_map(|t| {
                    let pfn = t.pfn.filter(|p| !p.trim().is_empty())?;
                    Some(OwnedTitle {
                        pfn,
                        name: t.name,
                        image: t.display_image,
                    })
                })
                .collect();
            tracing::debug!(count = titles.len(), "title history fetched");
            Ok(titles)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_encodes_pairs() {
        assert_eq!(
            form_body(&[("code", "M.C1 x"), ("scope", "a b")]),
            "code=M%2EC1%20x&scope=a%20b"
        );
    }

    #[test]
    fn xsts_response_parses() {
        let resp: XblResponse = serde_json::from_str(
            r#"{"IssueInstant":"2024-01-01T00:00:00Z","Token":"tok",
               "DisplayClaims":{"xui":[{"gtg":"Someone","xid":"2535","uhs":"123"}]}}"#,
        )
        .unwrap();
        let claims = first_claim(&resp, "xsts").unwrap();
        assert_eq!(resp.token, "tok");
        assert_eq!(claims.uhs, "123");
        assert_eq!(claims.xid.as_deref(), Some("2535"));
    }

    #[test]
    fn title_history_parses() {
        let history: TitleHistory = serde_json::from_str(
            r#"{"xuid":"2535","titles":[
                {"titleId":"1","pfn":"Microsoft.Halo_8wekyb3d8bbwe","name":"Halo","displayImage":"https://img/h.png"},
                {"titleId":"2","pfn":null,"name":"Xbox 360 Title"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(history.titles.len(), 2);
        assert_eq!(history.titles[1].pfn, None);
        assert_eq!(history.titles[0].display_image.as_deref(), Some("https://img/h.png"));
    }
}
