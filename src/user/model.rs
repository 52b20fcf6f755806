use chrono::{NaiveDateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub(crate) id: Id,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) created_at: NaiveDateTime,
}

impl User {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    #[cfg(test)]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub(crate) id: Id,
    pub(crate) username: &'a str,
    pub(crate) email: &'a str,
    pub(crate) password_hash: &'a str,
    pub(crate) created_at: NaiveDateTime,
}

impl<'a> NewUser<'a> {
    pub fn new(username: &'a str, email: &'a str, password_hash: &'a str) -> Self {
        Self {
            id: Id::random(),
            username,
            email,
            password_hash,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserDto {
    id: Id,
    email: String,
    username: String,
}

impl UserDto {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
        }
    }
}
