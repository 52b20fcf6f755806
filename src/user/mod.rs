use std::fmt::{self, Display};
use std::sync::Arc;

use axum::{Router, routing::post};
use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use repository::UserRepository;
use serde::{Deserialize, Serialize};
use service::UserService;
use uuid::Uuid;

use crate::{integration::db::uuid_sql, state::AppState};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn UserRepository + Send + Sync>;
pub type Service = Arc<dyn UserService + Send + Sync>;

const USERNAME_MAX_LEN: usize = 150;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/register/", post(handler::api::register))
        .with_state(s)
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Serialize,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    FromSqlRow,
    AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Uuid)]
pub struct Id(Uuid);

impl Id {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn get(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Id {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

uuid_sql!(Id);

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Letters, digits and `@.+-_` only, at most 150 characters.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::InvalidUsername("this field may not be blank"));
        }
        if self.0.chars().count() > USERNAME_MAX_LEN {
            return Err(Error::InvalidUsername(
                "ensure this field has no more than 150 characters",
            ));
        }
        let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
        if !self.0.chars().all(allowed) {
            return Err(Error::InvalidUsername(
                "may contain only letters, numbers, and @/./+/-/_ characters",
            ));
        }
        Ok(())
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Deserialize)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(****)")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0}")]
    NotFound(Username),
    #[error("user not found: {0}")]
    UnknownId(Id),
    #[error("a user with that username already exists: {0}")]
    AlreadyExists(Username),
    #[error("username: {0}")]
    InvalidUsername(&'static str),
    #[error("email: enter a valid email address")]
    InvalidEmail,
    #[error("password: this field may not be blank")]
    BlankPassword,

    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
    #[error(transparent)]
    _Bcrypt(#[from] bcrypt::BcryptError),
}
