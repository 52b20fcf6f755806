use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;

use crate::{auth, message, thread, user};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Thread(#[from] thread::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
}

impl From<&Error> for StatusCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::_Auth(e) => e.into(),
            Error::_User(e) => e.into(),
            Error::_Thread(e) => e.into(),
            Error::_Message(e) => e.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let status = StatusCode::from(&self);
        let message = if status.is_server_error() {
            error!("{self:?}");
            "Something went wrong".to_owned()
        } else {
            warn!("{self}");
            self.to_string()
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
