use blog_core::{BlogStore, TokenIssuer, UploadPolicy};
use std::sync::Arc;

use crate::config::ApiConfig;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub store: BlogStore,
    /// JWT 签发与校验
    pub tokens: Arc<TokenIssuer>,
    pub upload: Arc<UploadPolicy>,
}

impl AppState {
    pub fn new(config: Arc<ApiConfig>) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.credentials.clone())
            .with_issuer(config.jwt_issuer.clone())
            .with_ttl(config.jwt_expire);
        Self {
            store: BlogStore::new(&config.data_dir),
            tokens: Arc::new(tokens),
            upload: Arc::new(config.upload_policy()),
            config,
        }
    }
}
