use std::fmt::{self, Display};
use std::sync::Arc;

use axum::{Router, routing::get};
use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use repository::MessageRepository;
use serde::{Deserialize, Serialize};
use service::MessageService;
use uuid::Uuid;

use crate::{integration::db::uuid_sql, state::AppState, thread};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn MessageRepository + Send + Sync>;
pub type Service = Arc<dyn MessageService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/messages_list",
            get(handler::api::find_all).post(handler::api::create),
        )
        .route("/unread", get(handler::api::unread))
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

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("content: this field may not be blank")]
    EmptyContent,

    #[error(transparent)]
    _Thread(#[from] thread::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
