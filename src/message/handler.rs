use axum::http::StatusCode;

impl From<&super::Error> for StatusCode {
    fn from(e: &super::Error) -> Self {
        match e {
            super::Error::EmptyContent => Self::BAD_REQUEST,
            super::Error::_Thread(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use std::collections::BTreeMap;

    use axum::{Extension, Json, extract::State, http::StatusCode};
    use axum_extra::extract::WithRejection;
    use serde::Deserialize;

    use crate::{auth, message, message::model::MessageDto, thread::Title};

    #[derive(Deserialize)]
    pub struct FindParams {
        #[serde(default)]
        title: String,
    }

    pub async fn find_all(
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
        WithRejection(Json(params), _): WithRejection<Json<FindParams>, crate::Error>,
    ) -> crate::Result<Json<Vec<MessageDto>>> {
        let title = Title::try_from(params.title)?;

        let messages = message_service
            .read_thread(auth_user.id(), &title)
            .await?;

        Ok(Json(messages))
    }

    #[derive(Deserialize)]
    pub struct CreateParams {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
        WithRejection(Json(params), _): WithRejection<Json<CreateParams>, crate::Error>,
    ) -> crate::Result<(StatusCode, Json<MessageDto>)> {
        let title = Title::try_from(params.title)?;

        let message = message_service
            .create(auth_user.id(), &title, &params.content)
            .await?;

        Ok((StatusCode::CREATED, Json(message)))
    }

    pub async fn unread(
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
    ) -> crate::Result<Json<BTreeMap<String, i64>>> {
        let unread = message_service.count_unread(auth_user.id()).await?;
        Ok(Json(unread))
    }
}
