//! JWT 签发与校验：凭据为 (app_key, app_secret)

use crate::error::{BlogError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, instrument, warn};

const DEFAULT_JWT_ISSUER: &str = "blog-service";

/// 允许申请 token 的应用凭据
#[derive(Debug, Clone)]
pub struct AppCredential {
    pub app_key: String,
    pub app_secret: String,
}

/// JWT Claims 结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// app_key 的 SHA-256 摘要（hex）
    pub app_key: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: String,
    issuer: String,
    /// token 有效期（秒）
    ttl: i64,
    credentials: Vec<AppCredential>,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, credentials: Vec<AppCredential>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            ttl: 7200,
            credentials,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    /// 校验凭据是否存在（常量时间比较 secret）
    pub fn check_auth(&self, app_key: &str, app_secret: &str) -> bool {
        self.credentials.iter().any(|c| {
            c.app_key == app_key && bool::from(c.app_secret.as_bytes().ct_eq(app_secret.as_bytes()))
        })
    }

    /// 签发 token
    #[instrument(skip(self, app_key))]
    pub fn generate_token(&self, app_key: &str) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            app_key: digest_hex(app_key),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| BlogError::Other(e.to_string()))?;
        info!(app_key = %claims.app_key, "token issued");
        Ok(token)
    }

    /// 校验 token；过期返回 `TokenExpired`
    pub fn parse_token(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[self.issuer.clone()]);
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => BlogError::TokenExpired,
            _ => {
                warn!(error = %e, "token rejected");
                BlogError::Unauthorized(format!("invalid token: {e}"))
            }
        })
    }
}

fn digest_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            "test-secret",
            vec![AppCredential {
                app_key: "blog".into(),
                app_secret: "service".into(),
            }],
        )
    }

    #[test]
    fn check_auth_matches_pairs() {
        let issuer = issuer();
        assert!(issuer.check_auth("blog", "service"));
        assert!(!issuer.check_auth("blog", "wrong"));
        assert!(!issuer.check_auth("other", "service"));
    }

    #[test]
    fn token_round_trip() {
        let issuer = issuer();
        let token = issuer.generate_token("blog").unwrap();
        let claims = issuer.parse_token(&token).unwrap();
        assert_eq!(claims.app_key, digest_hex("blog"));
        assert_eq!(claims.iss, "blog-service");
    }

    #[test]
    fn expired_token_is_reported() {
        let issuer = issuer().with_ttl(-3600);
        let token = issuer.generate_token("blog").unwrap();
        assert!(matches!(issuer.parse_token(&token), Err(BlogError::TokenExpired)));
    }

    #[test]
    fn foreign_issuer_rejected() {
        let token = issuer().with_issuer("someone-else").generate_token("blog").unwrap();
        assert!(matches!(
            issuer().parse_token(&token),
            Err(BlogError::Unauthorized(_))
        ));
    }
}
