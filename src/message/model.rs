use chrono::{NaiveDateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{thread, user};

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    pub(crate) id: Id,
    pub(crate) thread_id: thread::Id,
    pub(crate) sender: user::Id,
    pub(crate) content: String,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) is_read: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage<'a> {
    pub(crate) id: Id,
    pub(crate) thread_id: &'a thread::Id,
    pub(crate) sender: &'a user::Id,
    pub(crate) content: &'a str,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) is_read: bool,
}

impl<'a> NewMessage<'a> {
    pub fn new(thread_id: &'a thread::Id, sender: &'a user::Id, content: &'a str) -> Self {
        Self {
            id: Id::random(),
            thread_id,
            sender,
            content,
            created_at: Utc::now().naive_utc(),
            is_read: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageDto {
    id: Id,
    sender: user::Id,
    content: String,
    thread: thread::Id,
    created_at: NaiveDateTime,
    is_read: bool,
}

#[cfg(test)]
impl MessageDto {
    pub const fn sender(&self) -> &user::Id {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn is_read(&self) -> bool {
        self.is_read
    }
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender: m.sender,
            content: m.content,
            thread: m.thread_id,
            created_at: m.created_at,
            is_read: m.is_read,
        }
    }
}
