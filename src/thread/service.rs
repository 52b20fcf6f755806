use async_trait::async_trait;
use log::{debug, info};

use super::model::{NewThread, Thread, ThreadDto};
use super::{Repository, Title};
use crate::user;

/// Outcome of a create request: either a fresh thread or the requester's
/// existing thread with the same title.
#[derive(Debug)]
pub enum Creation {
    Created(ThreadDto),
    Existing(ThreadDto),
}

#[async_trait]
pub trait ThreadService {
    async fn find_all(&self) -> super::Result<Vec<ThreadDto>>;

    async fn create(
        &self,
        auth_id: &user::Id,
        title: &Title,
        participant: Option<&user::Username>,
    ) -> super::Result<Creation>;

    async fn add_participant(
        &self,
        auth_id: &user::Id,
        title: &Title,
        username: &user::Username,
    ) -> super::Result<ThreadDto>;

    async fn delete(&self, auth_id: &user::Id, title: &Title) -> super::Result<()>;

    /// Loads the thread, then checks membership, so that an absent thread and
    /// a foreign thread produce different errors.
    async fn find_for_member(&self, title: &Title, member: &user::Id) -> super::Result<Thread>;

    async fn find_by_member(&self, member: &user::Id) -> super::Result<Vec<Thread>>;
}

#[derive(Clone)]
pub struct ThreadServiceImpl {
    repo: Repository,
    user_service: user::Service,
}

impl ThreadServiceImpl {
    pub fn new(repo: Repository, user_service: user::Service) -> Self {
        Self { repo, user_service }
    }
}

#[async_trait]
impl ThreadService for ThreadServiceImpl {
    async fn find_all(&self) -> super::Result<Vec<ThreadDto>> {
        let threads = self.repo.find_all()?;

        let mut dtos = Vec::with_capacity(threads.len());
        for t in threads {
            dtos.push(self.to_dto(t)?);
        }
        Ok(dtos)
    }

    async fn create(
        &self,
        auth_id: &user::Id,
        title: &Title,
        participant: Option<&user::Username>,
    ) -> super::Result<Creation> {
        if let Some(existing) = self.repo.find_by_title(title)? {
            return self.existing_for(existing, auth_id);
        }

        let mut members = vec![*auth_id];
        if let Some(username) = participant {
            let other = self.user_service.find_by_username(username).await?;
            if other.id().eq(auth_id) {
                return Err(super::Error::SelfParticipant);
            }
            members.push(*other.id());
        }

        let thread = match self.repo.insert(&NewThread::new(title), &members) {
            Ok(thread) => thread,
            // a concurrent create won the title
            Err(super::Error::AlreadyExists) => {
                let existing = self
                    .repo
                    .find_by_title(title)?
                    .ok_or(super::Error::AlreadyExists)?;
                return self.existing_for(existing, auth_id);
            }
            Err(e) => return Err(e),
        };
        info!("Created thread '{title}' ({})", thread.id());

        Ok(Creation::Created(ThreadDto::new(thread, members)))
    }

    async fn add_participant(
        &self,
        auth_id: &user::Id,
        title: &Title,
        username: &user::Username,
    ) -> super::Result<ThreadDto> {
        let thread = self.find_for_member(title, auth_id).await?;
        let new_member = self.user_service.find_by_username(username).await?;

        let thread = self.repo.add_member(thread.id(), new_member.id())?;
        info!("User {username} added to thread '{title}'");

        self.to_dto(thread)
    }

    async fn delete(&self, auth_id: &user::Id, title: &Title) -> super::Result<()> {
        let thread = self.find_for_member(title, auth_id).await?;

        if !self.repo.delete(thread.id())? {
            return Err(super::Error::NotFound(title.clone()));
        }

        info!("Thread '{title}' deleted by {auth_id}");
        Ok(())
    }

    async fn find_for_member(&self, title: &Title, member: &user::Id) -> super::Result<Thread> {
        let thread = self
            .repo
            .find_by_title(title)?
            .ok_or_else(|| super::Error::NotFound(title.clone()))?;

        let members = self.repo.find_members(thread.id())?;
        if !members.contains(member) {
            return Err(super::Error::NotParticipant(title.clone()));
        }

        Ok(thread)
    }

    async fn find_by_member(&self, member: &user::Id) -> super::Result<Vec<Thread>> {
        self.repo.find_by_member(member)
    }
}

impl ThreadServiceImpl {
    fn to_dto(&self, t: Thread) -> super::Result<ThreadDto> {
        let members = self.repo.find_members(t.id())?;
        Ok(ThreadDto::new(t, members))
    }

    /// Hands a thread with a taken title back only to its participants.
    fn existing_for(&self, existing: Thread, auth_id: &user::Id) -> super::Result<Creation> {
        let members = self.repo.find_members(existing.id())?;
        if !members.contains(auth_id) {
            return Err(super::Error::AlreadyExists);
        }

        debug!("Thread '{}' already exists for {auth_id}", existing.title);
        Ok(Creation::Existing(ThreadDto::new(existing, members)))
    }
}
