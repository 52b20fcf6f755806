use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use log::debug;

use crate::auth;

pub async fn authorize(
    auth_service: State<auth::Service>,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(auth::Error::Unauthorized)?;

    let auth_user = auth_service.authenticate(bearer.token()).await?;
    debug!("Authorized {:?}", auth_user.username());

    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
