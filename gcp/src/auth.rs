//! Service-account credentials.
//!
//! Access tokens are minted by signing a JWT assertion with the account's
//! RSA key and exchanging it at the configured token endpoint. Tokens are
//! short-lived; [`Token::expired`] builds in a skew so a token is refreshed
//! before the provider would reject it mid-request.

use crate::config::ServiceAccount;
use crate::error::{self, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// A bearer token plus the instant it stops being trustworthy.
#[derive(Clone, Debug)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Signed-JWT credentials for one service account and one scope set.
#[derive(Clone, Debug)]
pub struct Credentials {
    account: ServiceAccount,
    scopes: Vec<String>,
}

impl Credentials {
    pub fn new(account: ServiceAccount, scopes: Vec<String>) -> Self {
        Self { account, scopes }
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn assertion(&self) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .context(error::JwtSignSnafu)?;
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: self.scopes.join(" "),
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &key).context(error::JwtSignSnafu)
    }

    /// Exchange a fresh assertion for an access token.
    pub async fn fetch_token(&self, http: &reqwest::Client) -> Result<Token> {
        let url = self.account.token_uri.clone();
        let assertion = self.assertion()?;
        let response = http
            .post(&url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .context(error::TokenRequestSnafu { url: url.clone() })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return error::TokenExchangeSnafu {
                url,
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let token: TokenResponse = response
            .json()
            .await
            .context(error::DecodeSnafu { url })?;
        Ok(Token {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}
