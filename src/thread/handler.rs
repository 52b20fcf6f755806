use axum::http::StatusCode;

impl From<&super::Error> for StatusCode {
    fn from(e: &super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotParticipant(_) => Self::FORBIDDEN,
            super::Error::AlreadyExists
            | super::Error::ParticipantLimit
            | super::Error::AlreadyParticipant => Self::CONFLICT,
            super::Error::SelfParticipant | super::Error::InvalidTitle(_) => Self::BAD_REQUEST,
            super::Error::_User(e) => e.into(),
            super::Error::_Diesel(diesel::result::Error::NotFound) => Self::NOT_FOUND,
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{Extension, Json, extract::State, http::StatusCode};
    use axum_extra::extract::WithRejection;
    use serde::{Deserialize, Serialize};

    use crate::{
        auth,
        thread::{self, Title, model::ThreadDto, service::Creation},
        user::Username,
    };

    pub async fn find_all(
        thread_service: State<thread::Service>,
    ) -> crate::Result<Json<Vec<ThreadDto>>> {
        let threads = thread_service.find_all().await?;
        Ok(Json(threads))
    }

    #[derive(Deserialize)]
    pub struct CreateParams {
        #[serde(default)]
        title: String,
        participants: Option<Username>,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        thread_service: State<thread::Service>,
        WithRejection(Json(params), _): WithRejection<Json<CreateParams>, crate::Error>,
    ) -> crate::Result<(StatusCode, Json<ThreadDto>)> {
        let title = Title::try_from(params.title)?;
        let participant = params.participants.filter(|p| !p.as_str().is_empty());

        let creation = thread_service
            .create(auth_user.id(), &title, participant.as_ref())
            .await?;

        Ok(match creation {
            Creation::Created(t) => (StatusCode::CREATED, Json(t)),
            Creation::Existing(t) => (StatusCode::OK, Json(t)),
        })
    }

    #[derive(Deserialize)]
    pub struct AddParticipantParams {
        #[serde(default)]
        title: String,
        username: Username,
    }

    pub async fn add_participant(
        Extension(auth_user): Extension<auth::User>,
        thread_service: State<thread::Service>,
        WithRejection(Json(params), _): WithRejection<Json<AddParticipantParams>, crate::Error>,
    ) -> crate::Result<Json<ThreadDto>> {
        let title = Title::try_from(params.title)?;

        let thread = thread_service
            .add_participant(auth_user.id(), &title, &params.username)
            .await?;

        Ok(Json(thread))
    }

    #[derive(Deserialize)]
    pub struct DeleteParams {
        #[serde(default)]
        title: String,
    }

    #[derive(Serialize)]
    pub struct Deleted {
        message: String,
    }

    pub async fn delete(
        Extension(auth_user): Extension<auth::User>,
        thread_service: State<thread::Service>,
        WithRejection(Json(params), _): WithRejection<Json<DeleteParams>, crate::Error>,
    ) -> crate::Result<Json<Deleted>> {
        let title = Title::try_from(params.title)?;

        thread_service.delete(auth_user.id(), &title).await?;

        Ok(Json(Deleted {
            message: format!("thread {title} deleted"),
        }))
    }
}
