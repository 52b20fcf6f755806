use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::message::model::{Message, NewMessage};
use crate::message::repository::MessageRepository;
use crate::thread::model::{NewThread, Thread};
use crate::thread::repository::ThreadRepository;
use crate::thread::{MAX_PARTICIPANTS, Title};
use crate::user::model::{NewUser, User};
use crate::user::repository::UserRepository;
use crate::user::{self, Username};
use crate::{message, thread};

/// Process-local store backing every repository in tests.
/// A single lock makes each repository call atomic, as a transaction would.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    threads: Vec<Thread>,
    members: Vec<(thread::Id, user::Id)>,
    messages: Vec<Message>,
}

impl MemoryDb {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl UserRepository for MemoryDb {
    fn insert(&self, u: &NewUser) -> Result<User, user::Error> {
        let mut tables = self.lock();
        if tables.users.iter().any(|x| x.username == u.username) {
            return Err(user::Error::AlreadyExists(Username::new(u.username)));
        }

        let user = User {
            id: u.id,
            username: u.username.to_string(),
            email: u.email.to_string(),
            password_hash: u.password_hash.to_string(),
            created_at: u.created_at,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    fn find_by_id(&self, id: &user::Id) -> Result<User, user::Error> {
        self.lock()
            .users
            .iter()
            .find(|u| u.id.eq(id))
            .cloned()
            .ok_or(user::Error::UnknownId(*id))
    }

    fn find_by_username(&self, username: &Username) -> Result<User, user::Error> {
        self.lock()
            .users
            .iter()
            .find(|u| u.username == username.as_str())
            .cloned()
            .ok_or_else(|| user::Error::NotFound(username.clone()))
    }
}

impl Tables {
    fn members_of(&self, id: &thread::Id) -> Vec<user::Id> {
        self.members
            .iter()
            .filter(|(t, _)| t.eq(id))
            .map(|(_, u)| *u)
            .collect()
    }
}

impl ThreadRepository for MemoryDb {
    fn insert(&self, t: &NewThread, members: &[user::Id]) -> Result<Thread, thread::Error> {
        if members.len() > MAX_PARTICIPANTS {
            return Err(thread::Error::ParticipantLimit);
        }
        let mut tables = self.lock();
        if tables.threads.iter().any(|x| x.title == t.title) {
            return Err(thread::Error::AlreadyExists);
        }

        let thread = Thread {
            id: t.id,
            title: t.title.to_string(),
            created_at: t.created_at,
            updated_at: t.updated_at,
        };
        tables.threads.push(thread.clone());
        tables
            .members
            .extend(members.iter().map(|m| (thread.id, *m)));
        Ok(thread)
    }

    fn find_all(&self) -> Result<Vec<Thread>, thread::Error> {
        Ok(self.lock().threads.clone())
    }

    fn find_by_title(&self, title: &Title) -> Result<Option<Thread>, thread::Error> {
        Ok(self
            .lock()
            .threads
            .iter()
            .find(|t| t.title == title.as_str())
            .cloned())
    }

    fn find_by_member(&self, member: &user::Id) -> Result<Vec<Thread>, thread::Error> {
        let tables = self.lock();
        Ok(tables
            .threads
            .iter()
            .filter(|t| tables.members_of(&t.id).contains(member))
            .cloned()
            .collect())
    }

    fn find_members(&self, id: &thread::Id) -> Result<Vec<user::Id>, thread::Error> {
        Ok(self.lock().members_of(id))
    }

    fn add_member(&self, id: &thread::Id, member: &user::Id) -> Result<Thread, thread::Error> {
        let mut tables = self.lock();
        let members = tables.members_of(id);

        let Some(pos) = tables.threads.iter().position(|t| t.id.eq(id)) else {
            return Err(diesel::result::Error::NotFound.into());
        };
        if members.contains(member) {
            return Err(thread::Error::AlreadyParticipant);
        }
        if members.len() >= MAX_PARTICIPANTS {
            return Err(thread::Error::ParticipantLimit);
        }

        tables.members.push((*id, *member));
        let thread = &mut tables.threads[pos];
        thread.updated_at = Utc::now().naive_utc();
        Ok(thread.clone())
    }

    fn delete(&self, id: &thread::Id) -> Result<bool, thread::Error> {
        let mut tables = self.lock();
        let before = tables.threads.len();

        tables.threads.retain(|t| t.id.ne(id));
        tables.members.retain(|(t, _)| t.ne(id));
        tables.messages.retain(|m| m.thread_id.ne(id));

        Ok(tables.threads.len() < before)
    }
}

impl MessageRepository for MemoryDb {
    fn insert(&self, m: &NewMessage) -> Result<Message, message::Error> {
        let message = Message {
            id: m.id,
            thread_id: *m.thread_id,
            sender: *m.sender,
            content: m.content.to_string(),
            created_at: m.created_at,
            is_read: m.is_read,
        };
        self.lock().messages.push(message.clone());
        Ok(message)
    }

    fn find_by_thread(&self, thread_id: &thread::Id) -> Result<Vec<Message>, message::Error> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.thread_id.eq(thread_id))
            .cloned()
            .collect())
    }

    fn mark_as_read(
        &self,
        thread_id: &thread::Id,
        reader: &user::Id,
    ) -> Result<usize, message::Error> {
        let mut marked = 0;
        for m in self.lock().messages.iter_mut() {
            if m.thread_id.eq(thread_id) && m.sender.ne(reader) && !m.is_read {
                m.is_read = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    fn count_unread(
        &self,
        thread_ids: &[thread::Id],
        reader: &user::Id,
    ) -> Result<HashMap<thread::Id, i64>, message::Error> {
        let mut counts = HashMap::new();
        for m in self.lock().messages.iter() {
            if thread_ids.contains(&m.thread_id) && m.sender.ne(reader) && !m.is_read {
                *counts.entry(m.thread_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
