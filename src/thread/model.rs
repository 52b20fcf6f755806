use chrono::{NaiveDateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::user;

use super::{Id, Title};

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::threads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Thread {
    pub(crate) id: Id,
    pub(crate) title: String,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) updated_at: NaiveDateTime,
}

impl Thread {
    pub const fn id(&self) -> &Id {
        &self.id
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::threads)]
pub struct NewThread<'a> {
    pub(crate) id: Id,
    pub(crate) title: &'a str,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) updated_at: NaiveDateTime,
}

impl<'a> NewThread<'a> {
    pub fn new(title: &'a Title) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Id::random(),
            title: title.as_str(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::threads_users)]
pub struct NewThreadUser<'a> {
    thread_id: &'a Id,
    user_id: &'a user::Id,
}

impl<'a> NewThreadUser<'a> {
    pub fn new(thread_id: &'a Id, user_id: &'a user::Id) -> Self {
        Self { thread_id, user_id }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreadDto {
    id: Id,
    title: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    participants: Vec<user::Id>,
}

impl ThreadDto {
    pub fn new(t: Thread, participants: Vec<user::Id>) -> Self {
        Self {
            id: t.id,
            title: t.title,
            created_at: t.created_at,
            updated_at: t.updated_at,
            participants,
        }
    }
}

#[cfg(test)]
impl ThreadDto {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn participants(&self) -> &[user::Id] {
        &self.participants
    }
}
