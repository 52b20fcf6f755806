use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;

use super::Repository;
use super::model::{MessageDto, NewMessage};
use crate::thread::{self, Title};
use crate::user;

#[async_trait]
pub trait MessageService {
    async fn create(
        &self,
        sender: &user::Id,
        title: &Title,
        content: &str,
    ) -> super::Result<MessageDto>;

    /// Returns every message of the thread, oldest first.
    ///
    /// This read mutates: messages from the other participant that were
    /// unread are flagged as read before the list is returned.
    async fn read_thread(&self, reader: &user::Id, title: &Title)
    -> super::Result<Vec<MessageDto>>;

    /// Title → number of unread messages from others, for every thread
    /// the reader participates in.
    async fn count_unread(&self, reader: &user::Id) -> super::Result<BTreeMap<String, i64>>;
}

#[derive(Clone)]
pub struct MessageServiceImpl {
    repo: Repository,
    thread_service: thread::Service,
}

impl MessageServiceImpl {
    pub fn new(repo: Repository, thread_service: thread::Service) -> Self {
        Self {
            repo,
            thread_service,
        }
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn create(
        &self,
        sender: &user::Id,
        title: &Title,
        content: &str,
    ) -> super::Result<MessageDto> {
        let content = content.trim();
        if content.is_empty() {
            return Err(super::Error::EmptyContent);
        }

        let thread = self.thread_service.find_for_member(title, sender).await?;
        let message = self
            .repo
            .insert(&NewMessage::new(thread.id(), sender, content))?;

        debug!("Message {} posted to '{title}' by {sender}", message.id);
        Ok(message.into())
    }

    async fn read_thread(
        &self,
        reader: &user::Id,
        title: &Title,
    ) -> super::Result<Vec<MessageDto>> {
        let thread = self.thread_service.find_for_member(title, reader).await?;

        let marked = self.repo.mark_as_read(thread.id(), reader)?;
        if marked > 0 {
            debug!("{reader} read {marked} message(s) in '{title}'");
        }

        let messages = self.repo.find_by_thread(thread.id())?;
        Ok(messages.into_iter().map(MessageDto::from).collect())
    }

    async fn count_unread(&self, reader: &user::Id) -> super::Result<BTreeMap<String, i64>> {
        let threads = self.thread_service.find_by_member(reader).await?;
        let ids = threads.iter().map(|t| *t.id()).collect::<Vec<_>>();

        let counts = self.repo.count_unread(&ids, reader)?;

        Ok(threads
            .into_iter()
            .map(|t| {
                let count = counts.get(t.id()).copied().unwrap_or(0);
                (t.title, count)
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::integration::memory::MemoryDb;
    use crate::message;
    use crate::thread::service::{ThreadService, ThreadServiceImpl};
    use crate::user::service::{UserService, UserServiceImpl};
    use crate::user::{Password, Username};

    use super::*;

    struct Fixture {
        service: MessageServiceImpl,
        threads: thread::Service,
        jora: user::Id,
        valera: user::Id,
        radu: user::Id,
    }

    async fn fixture() -> Fixture {
        let db = MemoryDb::default();
        let user_service: user::Service = Arc::new(UserServiceImpl::new(Arc::new(db.clone()), 4));

        let mut ids = Vec::new();
        for name in ["jora", "valera", "radu"] {
            let u = user_service
                .register("test@test.md", &Username::new(name), &Password::new("p"))
                .await
                .unwrap();
            ids.push(*u.id());
        }

        let threads: thread::Service =
            Arc::new(ThreadServiceImpl::new(Arc::new(db.clone()), user_service));
        threads
            .create(&ids[0], &title("t1"), Some(&Username::new("valera")))
            .await
            .unwrap();

        Fixture {
            service: MessageServiceImpl::new(Arc::new(db), threads.clone()),
            threads,
            jora: ids[0],
            valera: ids[1],
            radu: ids[2],
        }
    }

    fn title(s: &str) -> Title {
        Title::try_from(s).unwrap()
    }

    #[tokio::test]
    async fn should_post_unread_message() {
        let f = fixture().await;

        let dto = f
            .service
            .create(&f.jora, &title("t1"), "hello")
            .await
            .unwrap();

        assert_eq!(dto.content(), "hello");
        assert_eq!(dto.sender(), &f.jora);
        assert!(!dto.is_read());
    }

    #[tokio::test]
    async fn should_not_post_as_outsider() {
        let f = fixture().await;

        let result = f.service.create(&f.radu, &title("t1"), "hi").await;
        assert!(matches!(
            result,
            Err(message::Error::_Thread(thread::Error::NotParticipant(_)))
        ));

        let messages = f.service.read_thread(&f.jora, &title("t1")).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn should_not_post_blank_or_to_missing_thread() {
        let f = fixture().await;

        let blank = f.service.create(&f.jora, &title("t1"), "  ").await;
        assert!(matches!(blank, Err(message::Error::EmptyContent)));

        let missing = f.service.create(&f.jora, &title("nope"), "hi").await;
        assert!(matches!(
            missing,
            Err(message::Error::_Thread(thread::Error::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn should_mark_only_others_messages_as_read() {
        let f = fixture().await;
        f.service
            .create(&f.jora, &title("t1"), "hello")
            .await
            .unwrap();
        f.service
            .create(&f.valera, &title("t1"), "hi")
            .await
            .unwrap();

        let read_by_valera = f
            .service
            .read_thread(&f.valera, &title("t1"))
            .await
            .unwrap();

        assert_eq!(read_by_valera.len(), 2);
        assert_eq!(read_by_valera[0].content(), "hello");
        assert!(read_by_valera[0].is_read());
        assert!(!read_by_valera[1].is_read());
    }

    #[tokio::test]
    async fn should_never_revert_read_state() {
        let f = fixture().await;
        f.service
            .create(&f.jora, &title("t1"), "hello")
            .await
            .unwrap();
        f.service
            .read_thread(&f.valera, &title("t1"))
            .await
            .unwrap();

        let read_by_sender = f.service.read_thread(&f.jora, &title("t1")).await.unwrap();

        assert!(read_by_sender[0].is_read());
    }

    #[tokio::test]
    async fn should_not_read_as_outsider() {
        let f = fixture().await;
        f.service
            .create(&f.jora, &title("t1"), "hello")
            .await
            .unwrap();

        let result = f.service.read_thread(&f.radu, &title("t1")).await;
        assert!(matches!(
            result,
            Err(message::Error::_Thread(thread::Error::NotParticipant(_)))
        ));

        let unread = f.service.count_unread(&f.valera).await.unwrap();
        assert_eq!(unread.get("t1"), Some(&1));
    }

    #[tokio::test]
    async fn should_track_unread_counts() {
        let f = fixture().await;
        let unread = f.service.count_unread(&f.valera).await.unwrap();
        assert_eq!(unread.get("t1"), Some(&0));

        f.service
            .create(&f.jora, &title("t1"), "one")
            .await
            .unwrap();
        assert_eq!(
            f.service.count_unread(&f.valera).await.unwrap().get("t1"),
            Some(&1)
        );
        assert_eq!(
            f.service.count_unread(&f.jora).await.unwrap().get("t1"),
            Some(&0)
        );

        f.service
            .create(&f.jora, &title("t1"), "two")
            .await
            .unwrap();
        assert_eq!(
            f.service.count_unread(&f.valera).await.unwrap().get("t1"),
            Some(&2)
        );

        f.service
            .read_thread(&f.valera, &title("t1"))
            .await
            .unwrap();
        assert_eq!(
            f.service.count_unread(&f.valera).await.unwrap().get("t1"),
            Some(&0)
        );
    }

    #[tokio::test]
    async fn should_only_count_own_threads() {
        let f = fixture().await;
        f.service
            .create(&f.jora, &title("t1"), "one")
            .await
            .unwrap();

        let unread = f.service.count_unread(&f.radu).await.unwrap();

        assert!(unread.is_empty());
    }

    #[tokio::test]
    async fn should_forget_messages_of_deleted_thread() {
        let f = fixture().await;
        f.service
            .create(&f.jora, &title("t1"), "hello")
            .await
            .unwrap();

        f.threads.delete(&f.jora, &title("t1")).await.unwrap();

        let read = f.service.read_thread(&f.valera, &title("t1")).await;
        assert!(matches!(
            read,
            Err(message::Error::_Thread(thread::Error::NotFound(_)))
        ));
        assert!(f.service.count_unread(&f.valera).await.unwrap().is_empty());
    }
}
