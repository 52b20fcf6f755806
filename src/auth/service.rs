use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use uuid::Uuid;

use super::{Token, TokenClaims, TokenKind, TokenPair};
use crate::integration::idp;
use crate::user::{self, Password, Username};

#[async_trait]
pub trait AuthService {
    async fn obtain_pair(&self, username: &Username, password: &Password)
    -> super::Result<TokenPair>;

    async fn refresh(&self, refresh: &Token) -> super::Result<Token>;

    async fn authenticate(&self, access: &str) -> super::Result<super::User>;
}

#[derive(Clone)]
pub struct AuthServiceImpl {
    cfg: Arc<idp::Config>,
    user_service: user::Service,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    jwt_validator: Arc<Validation>,
}

impl AuthServiceImpl {
    pub fn new(cfg: &idp::Config, user_service: user::Service) -> Self {
        let jwt_validator = {
            let mut v = Validation::new(Algorithm::HS256);
            v.set_required_spec_claims(&["exp", "sub", "iss"]);
            v.set_issuer(&[cfg.issuer()]);
            v
        };

        Self {
            cfg: Arc::new(cfg.to_owned()),
            user_service,
            encoding_key: Arc::new(cfg.encoding_key()),
            decoding_key: Arc::new(cfg.decoding_key()),
            jwt_validator: Arc::new(jwt_validator),
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn obtain_pair(
        &self,
        username: &Username,
        password: &Password,
    ) -> super::Result<TokenPair> {
        let user = self
            .user_service
            .verify_credentials(username, password)
            .await?
            .ok_or(super::Error::InvalidCredentials)?;

        debug!("Issuing token pair for {username}");
        Ok(TokenPair {
            access: self.issue(user.id(), TokenKind::Access)?,
            refresh: self.issue(user.id(), TokenKind::Refresh)?,
        })
    }

    async fn refresh(&self, refresh: &Token) -> super::Result<Token> {
        let claims = self.validate(&refresh.0, TokenKind::Refresh)?;
        let user = self.resolve(&claims.sub).await?;

        debug!("Refreshing access token for {}", user.id());
        self.issue(user.id(), TokenKind::Access)
    }

    async fn authenticate(&self, access: &str) -> super::Result<super::User> {
        let claims = self.validate(access, TokenKind::Access)?;
        self.resolve(&claims.sub).await
    }
}

impl AuthServiceImpl {
    fn issue(&self, sub: &user::Id, kind: TokenKind) -> super::Result<Token> {
        let ttl = match kind {
            TokenKind::Access => self.cfg.access_ttl(),
            TokenKind::Refresh => self.cfg.refresh_ttl(),
        };
        let now = Utc::now().timestamp();

        let claims = TokenClaims {
            sub: *sub,
            jti: Uuid::new_v4(),
            iss: self.cfg.issuer().to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
            token_type: kind,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(Token(token))
    }

    fn validate(&self, token: &str, expected: TokenKind) -> super::Result<TokenClaims> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.jwt_validator)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Failed to decode token claims: {e:?}");
                super::Error::InvalidToken
            })?;

        if claims.token_type != expected {
            return Err(super::Error::WrongTokenType(expected));
        }

        Ok(claims)
    }

    async fn resolve(&self, id: &user::Id) -> super::Result<super::User> {
        match self.user_service.find_by_id(id).await {
            Ok(u) => Ok(u.into()),
            Err(user::Error::UnknownId(_)) => {
                warn!("Token subject {id} no longer exists");
                Err(super::Error::InvalidToken)
            }
            Err(e) => Err(e.into()),
        }
    }
}
