//! One-time authorization flow that fills the entitlement cache.
//!
//! The user opens [`AuthFlow::authorize_url`] in a browser, signs in, and
//! pastes back either the code or the whole redirect URL. [`AuthFlow::complete`]
//! walks the token chain and stores the owned titles.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::cache::{Entitlements, ResultCache, TitleMeta};
use crate::error::AuthError;

pub const AUTHORIZE_ENDPOINT: &str = "https://login.live.com/oauth20_authorize.srf";
pub const REDIRECT_URI: &str = "https://login.live.com/oauth20_desktop.srf";
pub const SCOPE: &str = "Xboxlive.signin Xboxlive.offline_access";

/// XSTS token with the claims needed for the title hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XstsToken {
    pub token: String,
    pub user_hash: String,
    pub xuid: String,
}

/// A title from the user's history that maps to a local package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTitle {
    pub pfn: String,
    pub name: String,
    pub image: Option<String>,
}

/// The network side of the flow.
pub trait EntitlementApi: Send + Sync {
    /// Exchanges an authorization code for an access token.
    fn exchange_code<'a>(
        &'a self,
        client_id: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, Result<String, AuthError>>;

    /// Exchanges an access token for an Xbox Live user token.
    fn user_token<'a>(&'a self, access_token: &'a str) -> BoxFuture<'a, Result<String, AuthError>>;

    /// Exchanges a user token for an XSTS token.
    fn xsts_token<'a>(&'a self, user_token: &'a str)
    -> BoxFuture<'a, Result<XstsToken, AuthError>>;

    /// Fetches the title history.
    fn title_history<'a>(
        &'a self,
        xsts: &'a XstsToken,
    ) -> BoxFuture<'a, Result<Vec<OwnedTitle>, AuthError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Waiting for the user to paste a code from this URL.
    AwaitingCode { url: String },
    /// Entitlements stored.
    Complete { titles: usize },
}

/// Builds the consumer authorize URL for `client_id`.
pub fn authorize_url(client_id: &str) -> String {
    let enc = |s: &str| utf8_percent_encode(s, NON_ALPHANUMERIC).to_string();
    format!(
        "{AUTHORIZE_ENDPOINT}?client_id={}&response_type=code&approval_prompt=auto&scope={}&redirect_uri={}",
        enc(client_id),
        enc(SCOPE),
        enc(REDIRECT_URI),
    )
}

/// Pulls the `code` parameter out of a redirect URL, or accepts a bare code.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Some((_, query)) = input.split_once('?') else {
        let bare = !input.contains(['=', '&', '/', ' ']);
        return bare.then(|| input.to_string());
    };

    query
        .split(['&', '#'])
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "code")
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .filter(|code| !code.is_empty())
}

/// Authorization state machine.
pub struct AuthFlow {
    client_id: String,
    api: Arc<dyn EntitlementApi>,
    cache: Arc<dyn ResultCache>,
    state: AuthState,
}

impl AuthFlow {
    pub fn start(
        client_id: impl Into<String>,
        api: Arc<dyn EntitlementApi>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        let client_id = client_id.into();
        let state = AuthState::AwaitingCode {
            url: authorize_url(&client_id),
        };
        Self {
            client_id,
            api,
            cache,
            state,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn authorize_url(&self) -> String {
        authorize_url(&self.client_id)
    }

    /// Runs the token chain. On failure the flow goes back to
    /// [`AuthState::AwaitingCode`] and the error is returned.
    pub async fn complete(&mut self, pasted: &str) -> Result<usize, AuthError> {
        match self.run(pasted).await {
            Ok(count) => {
                tracing::info!(titles = count, "Xbox entitlements stored");
                self.state = AuthState::Complete { titles: count };
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Xbox authorization failed");
                self.state = AuthState::AwaitingCode {
                    url: self.authorize_url(),
                };
                Err(e)
            }
        }
    }

    async fn run(&self, pasted: &str) -> Result<usize, AuthError> {
        let code = extract_code(pasted).ok_or(AuthError::MissingCode)?;
        let access = self.api.exchange_code(&self.client_id, &code).await?;
        let user = self.api.user_token(&access).await?;
        let xsts = self.api.xsts_token(&user).await?;
        let titles = self.api.title_history(&xsts).await?;

        let entitlements = entitlements_from(titles);
        entitlements.store(self.cache.as_ref())?;
        Ok(entitlements.owned.len())
    }
}

/// Deduplicates titles by PFN, keeping the first occurrence.
fn entitlements_from(titles: Vec<OwnedTitle>) -> Entitlements {
    let mut owned = Vec::new();
    let mut metadata = BTreeMap::new();
    for title in titles {
        if title.pfn.trim().is_empty() || metadata.contains_key(&title.pfn) {
            continue;
        }
        owned.push(title.pfn.clone());
        metadata.insert(
            title.pfn,
            TitleMeta {
                name: title.name,
                image: title.image,
            },
        );
    }
    Entitlements { owned, metadata }
}
