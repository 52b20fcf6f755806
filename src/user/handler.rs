use axum::http::StatusCode;

impl From<&super::Error> for StatusCode {
    fn from(e: &super::Error) -> Self {
        match e {
            super::Error::NotFound(_) | super::Error::UnknownId(_) => Self::NOT_FOUND,
            super::Error::AlreadyExists(_) => Self::CONFLICT,
            super::Error::InvalidUsername(_)
            | super::Error::InvalidEmail
            | super::Error::BlankPassword => Self::BAD_REQUEST,
            super::Error::_R2d2(_) | super::Error::_Diesel(_) | super::Error::_Bcrypt(_) => {
                Self::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub(super) mod api {
    use axum::{Json, extract::State, http::StatusCode};
    use axum_extra::extract::WithRejection;
    use serde::Deserialize;

    use crate::user::{self, Password, Username, model::UserDto};

    #[derive(Deserialize)]
    pub struct RegisterParams {
        #[serde(default)]
        email: String,
        username: Username,
        password: Password,
    }

    pub async fn register(
        user_service: State<user::Service>,
        WithRejection(Json(params), _): WithRejection<Json<RegisterParams>, crate::Error>,
    ) -> crate::Result<(StatusCode, Json<UserDto>)> {
        let user = user_service
            .register(&params.email, &params.username, &params.password)
            .await?;

        Ok((StatusCode::CREATED, Json(user)))
    }
}
