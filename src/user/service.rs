use std::sync::Arc;

use async_trait::async_trait;
use email_address::EmailAddress;
use log::{debug, info, warn};
use uuid::Uuid;

use super::model::{NewUser, UserDto};
use super::{Id, Password, Repository, Username};

#[async_trait]
pub trait UserService {
    async fn register(
        &self,
        email: &str,
        username: &Username,
        password: &Password,
    ) -> super::Result<UserDto>;

    async fn find_by_id(&self, id: &Id) -> super::Result<UserDto>;

    async fn find_by_username(&self, username: &Username) -> super::Result<UserDto>;

    /// `None` when the user is unknown or the password does not match.
    async fn verify_credentials(
        &self,
        username: &Username,
        password: &Password,
    ) -> super::Result<Option<UserDto>>;
}

#[derive(Clone)]
pub struct UserServiceImpl {
    repo: Repository,
    bcrypt_cost: u32,
    // verified against for unknown usernames
    dummy_hash: Arc<str>,
}

impl UserServiceImpl {
    pub fn new(repo: Repository, bcrypt_cost: u32) -> Self {
        let dummy_hash = bcrypt::hash(Uuid::new_v4().to_string(), bcrypt_cost)
            .unwrap_or_else(|e| {
                warn!("Failed to prepare dummy password hash: {e}");
                String::new()
            });

        Self {
            repo,
            bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn register(
        &self,
        email: &str,
        username: &Username,
        password: &Password,
    ) -> super::Result<UserDto> {
        username.validate()?;
        let email = email.trim();
        if !EmailAddress::is_valid(email) {
            return Err(super::Error::InvalidEmail);
        }
        if password.as_str().trim().is_empty() {
            return Err(super::Error::BlankPassword);
        }

        let password_hash = bcrypt::hash(password.as_str(), self.bcrypt_cost)?;
        let user = self
            .repo
            .insert(&NewUser::new(username.as_str(), email, &password_hash))?;

        info!("Registered user {username} ({})", user.id());
        Ok(user.into())
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<UserDto> {
        self.repo.find_by_id(id).map(UserDto::from)
    }

    async fn find_by_username(&self, username: &Username) -> super::Result<UserDto> {
        self.repo.find_by_username(username).map(UserDto::from)
    }

    async fn verify_credentials(
        &self,
        username: &Username,
        password: &Password,
    ) -> super::Result<Option<UserDto>> {
        let user = match self.repo.find_by_username(username) {
            Ok(u) => u,
            Err(super::Error::NotFound(_)) => {
                debug!("Credentials check for unknown user {username}");
                let _ = bcrypt::verify(password.as_str(), &self.dummy_hash);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if bcrypt::verify(password.as_str(), user.password_hash())? {
            Ok(Some(user.into()))
        } else {
            debug!("Password mismatch for {username}");
            Ok(None)
        }
    }
}
