use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::service::AuthServiceImpl;
use crate::integration::{self, idp};
use crate::message::repository::PgMessageRepository;
use crate::message::service::MessageServiceImpl;
use crate::thread::repository::PgThreadRepository;
use crate::thread::service::ThreadServiceImpl;
use crate::user::repository::PgUserRepository;
use crate::user::service::UserServiceImpl;
use crate::{auth, message, thread, user};

#[derive(Clone)]
pub struct AppState {
    pub user_service: user::Service,
    pub auth_service: auth::Service,
    pub thread_service: thread::Service,
    pub message_service: message::Service,
}

impl AppState {
    pub fn init(cfg: &integration::Config) -> integration::Result<Self> {
        let pool = cfg.db.connect()?;

        Ok(Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgThreadRepository::new(pool.clone())),
            Arc::new(PgMessageRepository::new(pool)),
            &cfg.idp,
            cfg.bcrypt_cost,
        ))
    }

    pub fn new(
        user_repo: user::Repository,
        thread_repo: thread::Repository,
        message_repo: message::Repository,
        idp_cfg: &idp::Config,
        bcrypt_cost: u32,
    ) -> Self {
        let user_service: user::Service = Arc::new(UserServiceImpl::new(user_repo, bcrypt_cost));
        let auth_service = Arc::new(AuthServiceImpl::new(idp_cfg, user_service.clone()));
        let thread_service: thread::Service =
            Arc::new(ThreadServiceImpl::new(thread_repo, user_service.clone()));
        let message_service = Arc::new(MessageServiceImpl::new(
            message_repo,
            thread_service.clone(),
        ));

        Self {
            user_service,
            auth_service,
            thread_service,
            message_service,
        }
    }
}

impl FromRef<AppState> for user::Service {
    fn from_ref(s: &AppState) -> Self {
        s.user_service.clone()
    }
}

impl FromRef<AppState> for auth::Service {
    fn from_ref(s: &AppState) -> Self {
        s.auth_service.clone()
    }
}

impl FromRef<AppState> for thread::Service {
    fn from_ref(s: &AppState) -> Self {
        s.thread_service.clone()
    }
}

impl FromRef<AppState> for message::Service {
    fn from_ref(s: &AppState) -> Self {
        s.message_service.clone()
    }
}
