use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use serde::{Deserialize, Serialize};
use simple_chat::{Raw, Redact};
use uuid::Uuid;

use crate::state::AppState;
use crate::user::{self, model::UserDto};

mod handler;
pub mod middleware;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::AuthService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/token/", post(handler::api::obtain_pair))
        .route("/token/refresh/", post(handler::api::refresh))
        .with_state(s)
}

/// The authenticated requester, resolved from a valid access token.
#[derive(Clone, Debug)]
pub struct User {
    id: user::Id,
    username: user::Username,
}

impl User {
    pub fn new(id: user::Id, username: user::Username) -> Self {
        Self { id, username }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }

    pub fn username(&self) -> &user::Username {
        &self.username
    }
}

impl From<UserDto> for User {
    fn from(u: UserDto) -> Self {
        Self::new(*u.id(), user::Username::new(u.username()))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug)]
struct TokenClaims {
    sub: user::Id,
    jti: Uuid,
    iss: String,
    iat: i64,
    exp: i64,
    token_type: TokenKind,
}

#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct Token(String);

impl Raw for Token {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl Redact for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.redact())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenPair {
    pub access: Token,
    pub refresh: Token,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("authentication credentials were not provided")]
    Unauthorized,
    #[error("no active account found with the given credentials")]
    InvalidCredentials,
    #[error("token is invalid or expired")]
    InvalidToken,
    #[error("token has wrong type, expected {0:?}")]
    WrongTokenType(TokenKind),

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _JsonWebtoken(#[from] jsonwebtoken::errors::Error),
}
