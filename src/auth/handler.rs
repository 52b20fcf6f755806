use axum::http::StatusCode;

impl From<&super::Error> for StatusCode {
    fn from(e: &super::Error) -> Self {
        match e {
            super::Error::Unauthorized
            | super::Error::InvalidCredentials
            | super::Error::InvalidToken
            | super::Error::WrongTokenType(_) => Self::UNAUTHORIZED,
            super::Error::_User(e) => e.into(),
            super::Error::_JsonWebtoken(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{Json, extract::State};
    use axum_extra::extract::WithRejection;
    use serde::{Deserialize, Serialize};

    use crate::{
        auth::{self, Token, TokenPair},
        user::{Password, Username},
    };

    #[derive(Deserialize)]
    pub struct CredentialsParams {
        username: Username,
        password: Password,
    }

    pub async fn obtain_pair(
        auth_service: State<auth::Service>,
        WithRejection(Json(params), _): WithRejection<Json<CredentialsParams>, crate::Error>,
    ) -> crate::Result<Json<TokenPair>> {
        let pair = auth_service
            .obtain_pair(&params.username, &params.password)
            .await?;
        Ok(Json(pair))
    }

    #[derive(Deserialize)]
    pub struct RefreshParams {
        refresh: Token,
    }

    #[derive(Serialize)]
    pub struct AccessDto {
        access: Token,
    }

    pub async fn refresh(
        auth_service: State<auth::Service>,
        WithRejection(Json(params), _): WithRejection<Json<RefreshParams>, crate::Error>,
    ) -> crate::Result<Json<AccessDto>> {
        let access = auth_service.refresh(&params.refresh).await?;
        Ok(Json(AccessDto { access }))
    }
}
