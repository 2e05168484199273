//! Core library for the blog service: entities, JSON-file storage, upload policy, token issuing
//! and translated validation errors.

pub mod auth;
mod error;
mod models;
mod store;
pub mod upload;
pub mod validation;

pub use auth::{AppCredential, TokenClaims, TokenIssuer};
pub use error::{BlogError, Result};
pub use models::{
    Article, ArticleDetail, ArticleFilter, ArticleUpdate, NewArticle, NewTag, Tag, TagFilter,
    TagUpdate, STATE_DISABLED, STATE_ENABLED,
};
pub use store::BlogStore;
pub use upload::{FileType, UploadPolicy};
pub use validation::{Locale, Translator, ValidError, ValidErrors};
