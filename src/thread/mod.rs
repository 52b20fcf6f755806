use std::fmt::{self, Display};
use std::sync::Arc;

use axum::{Router, routing::get};
use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use repository::ThreadRepository;
use serde::{Deserialize, Serialize};
use service::ThreadService;
use uuid::Uuid;

use crate::{integration::db::uuid_sql, state::AppState, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn ThreadRepository + Send + Sync>;
pub type Service = Arc<dyn ThreadService + Send + Sync>;

pub const MAX_PARTICIPANTS: usize = 2;
const TITLE_MAX_LEN: usize = 200;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/threads_list",
            get(handler::api::find_all)
                .post(handler::api::create)
                .put(handler::api::add_participant)
                .delete(handler::api::delete),
        )
        .with_state(s)
}

#[derive(
    Clone, Copy, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, FromSqlRow, AsExpression,
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

/// Globally unique thread title: trimmed, non-blank, at most 200 characters.
#[derive(Clone, Debug, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Title(String);

impl Title {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Title {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidTitle("this field may not be blank"));
        }
        if trimmed.chars().count() > TITLE_MAX_LEN {
            return Err(Error::InvalidTitle(
                "ensure this field has no more than 200 characters",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<&str> for Title {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("thread doesn't exist: {0}")]
    NotFound(Title),
    #[error("user isn't a participant in the thread: {0}")]
    NotParticipant(Title),
    #[error("thread title is already taken")]
    AlreadyExists,
    #[error("thread can't have more than 2 participants")]
    ParticipantLimit,
    #[error("user is already a participant in the thread")]
    AlreadyParticipant,
    #[error("thread creator is added as participant implicitly")]
    SelfParticipant,
    #[error("title: {0}")]
    InvalidTitle(&'static str),

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
