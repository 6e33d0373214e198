use crate::token_store::TokenStore;
use chrono::{DateTime, Duration, Utc};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse, BasicTokenType};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, RefreshToken,
    RequestTokenError, TokenResponse, TokenUrl,
};
use serde::Serialize;
use sweeper_core::{
    AuthError, ClientConfig, ConfigError, CoreError, Credential, YOUTUBE_FORCE_SSL_SCOPE,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use url::Url;

/// Access tokens expiring within this window are refreshed before use.
pub const REFRESH_WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum AuthState {
    Unauthenticated,
    /// A code exchange is in flight.
    Exchanging,
    Authenticated {
        #[serde(rename = "expiresAt")]
        expires_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug)]
struct AuthInner {
    state: AuthState,
    credential: Option<Credential>,
}

impl AuthInner {
    fn authenticated(credential: Credential) -> Self {
        Self {
            state: AuthState::Authenticated {
                expires_at: credential.expiry,
            },
            credential: Some(credential),
        }
    }

    /// Derives the state from whatever credential is currently held.
    fn settle(&mut self) {
        self.state = match &self.credential {
            Some(credential) => AuthState::Authenticated {
                expires_at: credential.expiry,
            },
            None => AuthState::Unauthenticated,
        };
    }
}

/// OAuth2 client for the Google identity provider.
///
/// Holds the single active credential for the process and persists every
/// replacement through its [`TokenStore`]. The state lock is never held
/// across a network call; exchange, refresh and logout run one at a time.
#[derive(Debug)]
pub struct AuthClient {
    config: ClientConfig,
    oauth: BasicClient,
    auth_url: Url,
    store: TokenStore,
    inner: RwLock<AuthInner>,
    flow: Mutex<()>,
}

impl AuthClient {
    pub fn new(config: ClientConfig, store: TokenStore) -> Result<Self, CoreError> {
        let auth_url = Url::parse(&config.auth_uri)
            .map_err(|_| invalid_value("auth_uri", &config.auth_uri))?;

        let oauth = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_uri.clone())
                .map_err(|_| invalid_value("auth_uri", &config.auth_uri))?,
            Some(
                TokenUrl::new(config.token_uri.clone())
                    .map_err(|_| invalid_value("token_uri", &config.token_uri))?,
            ),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.clone())
                .map_err(|_| invalid_value("redirect_uri", &config.redirect_uri))?,
        );

        Ok(Self {
            config,
            oauth,
            auth_url,
            store,
            inner: RwLock::new(AuthInner {
                state: AuthState::Unauthenticated,
                credential: None,
            }),
            flow: Mutex::new(()),
        })
    }

    pub fn required_scopes() -> Vec<&'static str> {
        vec![YOUTUBE_FORCE_SSL_SCOPE]
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Loads the persisted credential, if any. Returns whether one was found.
    pub async fn load_persisted(&self) -> Result<bool, CoreError> {
        match self.store.load()? {
            Some(credential) => {
                if credential.is_expired() && credential.refresh_token.is_none() {
                    warn!("Stored access token is expired and has no refresh token");
                }
                *self.inner.write().await = AuthInner::authenticated(credential);
                info!("Restored credential from {}", self.store.path().display());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Consent URL for the given scopes. Duplicate scopes are collapsed,
    /// keeping first-seen order.
    pub fn build_authorization_url<I, S>(&self, scopes: I) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for scope in scopes {
            let scope = scope.as_ref().trim();
            if !scope.is_empty() && !unique.iter().any(|s| s == scope) {
                unique.push(scope.to_string());
            }
        }

        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("scope", &unique.join(" "))
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri);
        url
    }

    /// Trades an authorization code for a credential and persists it.
    ///
    /// On any failure the state falls back to the credential already held
    /// and the token file is left as it was.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, CoreError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CoreError::invalid_input("Authorization code is required"));
        }

        let _flow = self.flow.lock().await;
        let prior_credential = {
            let mut inner = self.inner.write().await;
            inner.state = AuthState::Exchanging;
            inner.credential.clone()
        };

        debug!("Exchanging authorization code at {}", self.config.token_uri);
        let result = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await;

        let credential = match result {
            // The provider omits the refresh token on repeat consent.
            Ok(token) => credential_from_token(&token, prior_credential.as_ref()),
            Err(e) => {
                let reason = describe_token_error(&e);
                error!("Authorization code exchange failed: {}", reason);
                self.inner.write().await.settle();
                return Err(AuthError::ExchangeFailed { reason }.into());
            }
        };

        if let Err(e) = self.store.save(&credential) {
            error!("Failed to persist exchanged token: {}", e);
            self.inner.write().await.settle();
            return Err(e);
        }

        *self.inner.write().await = AuthInner::authenticated(credential.clone());
        info!("Authorization code exchanged, credential stored");
        Ok(credential)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// If the held credential was replaced while the request was in flight,
    /// the replacement wins and the refreshed token is discarded.
    pub async fn refresh(&self) -> Result<Credential, CoreError> {
        let _flow = self.flow.lock().await;
        let current = self
            .inner
            .read()
            .await
            .credential
            .clone()
            .ok_or(AuthError::NotAuthenticated)?;
        let refresh_token = current
            .refresh_token
            .clone()
            .ok_or(AuthError::MissingRefreshToken)?;

        debug!("Refreshing access token");
        let token = self
            .oauth
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                let reason = describe_token_error(&e);
                error!("Token refresh failed: {}", reason);
                AuthError::RefreshFailed { reason }
            })?;

        let credential = credential_from_token(&token, Some(&current));
        let mut inner = self.inner.write().await;
        if inner.credential.as_ref() != Some(&current) {
            warn!("Credential changed during refresh, discarding refreshed token");
            return inner
                .credential
                .clone()
                .ok_or_else(|| AuthError::NotAuthenticated.into());
        }
        self.store.save(&credential)?;
        *inner = AuthInner::authenticated(credential.clone());
        info!("Access token refreshed");
        Ok(credential)
    }

    /// Bearer token for an authenticated API call, refreshed first when it
    /// is about to expire.
    pub async fn access_token(&self) -> Result<String, CoreError> {
        let credential = {
            let inner = self.inner.read().await;
            match (&inner.state, &inner.credential) {
                (AuthState::Authenticated { .. }, Some(credential)) => credential.clone(),
                _ => return Err(AuthError::NotAuthenticated.into()),
            }
        };

        if !credential.expires_within(Duration::seconds(REFRESH_WINDOW_SECS)) {
            return Ok(credential.access_token);
        }

        if credential.refresh_token.is_some() {
            return Ok(self.refresh().await?.access_token);
        }

        if credential.is_expired() {
            Err(AuthError::MissingRefreshToken.into())
        } else {
            Ok(credential.access_token)
        }
    }

    /// Installs a credential in memory without persisting it.
    pub async fn set_credential(&self, credential: Credential) {
        *self.inner.write().await = AuthInner::authenticated(credential);
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        let _flow = self.flow.lock().await;
        {
            let mut inner = self.inner.write().await;
            inner.state = AuthState::Unauthenticated;
            inner.credential = None;
        }
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn state(&self) -> AuthState {
        self.inner.read().await.state.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.inner.read().await.state, AuthState::Authenticated { .. })
    }

    pub async fn needs_refresh(&self) -> bool {
        self.inner
            .read()
            .await
            .credential
            .as_ref()
            .map(|c| c.expires_within(Duration::seconds(REFRESH_WINDOW_SECS)))
            .unwrap_or(false)
    }

    pub async fn current_credential(&self) -> Option<Credential> {
        self.inner.read().await.credential.clone()
    }
}

fn invalid_value(field: &str, value: &str) -> CoreError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

fn describe_token_error<RE>(err: &RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => match response.error_description() {
            Some(description) => format!("{}: {}", response.error(), description),
            None => response.error().to_string(),
        },
        RequestTokenError::Request(e) => format!("request failed: {}", e),
        RequestTokenError::Parse(e, _) => format!("unreadable token response: {}", e),
        RequestTokenError::Other(message) => message.clone(),
    }
}

fn credential_from_token(token: &BasicTokenResponse, previous: Option<&Credential>) -> Credential {
    let token_type = match token.token_type() {
        BasicTokenType::Bearer => "Bearer".to_string(),
        other => other.as_ref().to_string(),
    };

    let scope = token
        .scopes()
        .map(|scopes| {
            scopes
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .or_else(|| previous.and_then(|p| p.scope.clone()));

    let expiry = token
        .expires_in()
        .and_then(|d| Duration::from_std(d).ok())
        .map(|d| Utc::now() + d);

    Credential {
        access_token: token.access_token().secret().clone(),
        refresh_token: token
            .refresh_token()
            .map(|t| t.secret().clone())
            .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
        expiry,
        scope,
        token_type,
    }
}
