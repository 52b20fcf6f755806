use std::collections::HashMap;

use diesel::ExpressionMethods;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::dsl::count_star;
use uuid::Uuid;

use crate::integration::db::Pool;
use crate::schema::messages;
use crate::{thread, user};

use super::model::{Message, NewMessage};

pub trait MessageRepository {
    fn insert(&self, message: &NewMessage) -> super::Result<Message>;

    /// In insertion order.
    fn find_by_thread(&self, thread_id: &thread::Id) -> super::Result<Vec<Message>>;

    /// Flags every unread message in the thread not sent by `reader` as read.
    /// Returns how many messages changed state.
    fn mark_as_read(&self, thread_id: &thread::Id, reader: &user::Id) -> super::Result<usize>;

    /// Unread messages not sent by `reader`, per thread. Threads without any
    /// are absent from the result.
    fn count_unread(
        &self,
        thread_ids: &[thread::Id],
        reader: &user::Id,
    ) -> super::Result<HashMap<thread::Id, i64>>;
}

pub struct PgMessageRepository {
    pool: Pool,
}

impl PgMessageRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn insert(&self, m: &NewMessage) -> super::Result<Message> {
        let mut conn = self.pool.get()?;

        let message = diesel::insert_into(messages::table)
            .values(m)
            .returning(Message::as_returning())
            .get_result(&mut conn)?;

        Ok(message)
    }

    fn find_by_thread(&self, thread_id: &thread::Id) -> super::Result<Vec<Message>> {
        let mut conn = self.pool.get()?;

        let messages = messages::table
            .filter(messages::thread_id.eq(thread_id))
            .order(messages::seq.asc())
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok(messages)
    }

    fn mark_as_read(&self, thread_id: &thread::Id, reader: &user::Id) -> super::Result<usize> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            messages::table
                .filter(messages::thread_id.eq(thread_id))
                .filter(messages::sender.ne(reader))
                .filter(messages::is_read.eq(false)),
        )
        .set(messages::is_read.eq(true))
        .execute(&mut conn)?;

        Ok(updated)
    }

    fn count_unread(
        &self,
        thread_ids: &[thread::Id],
        reader: &user::Id,
    ) -> super::Result<HashMap<thread::Id, i64>> {
        if thread_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get()?;

        let ids = thread_ids.iter().map(|id| *id.get()).collect::<Vec<Uuid>>();
        let counts = messages::table
            .filter(messages::thread_id.eq_any(ids))
            .filter(messages::is_read.eq(false))
            .filter(messages::sender.ne(reader))
            .group_by(messages::thread_id)
            .select((messages::thread_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?;

        Ok(counts
            .into_iter()
            .map(|(id, count)| (thread::Id::from(id), count))
            .collect())
    }
}

#[cfg(test)]
mod test {
    use crate::integration::db::tests::TestContainer;
    use crate::thread::Title;
    use crate::thread::model::NewThread;
    use crate::thread::repository::{PgThreadRepository, ThreadRepository};
    use crate::user::model::NewUser;
    use crate::user::repository::{PgUserRepository, UserRepository};

    use super::*;

    struct Fixture {
        _container: TestContainer,
        repo: PgMessageRepository,
        threads: PgThreadRepository,
        thread: thread::Id,
        jora: user::Id,
        valera: user::Id,
    }

    async fn fixture() -> Fixture {
        let container = TestContainer::init().await;
        let users = PgUserRepository::new(container.pool.clone());
        let jora = *users
            .insert(&NewUser::new("jora", "j@test.md", "hash"))
            .unwrap()
            .id();
        let valera = *users
            .insert(&NewUser::new("valera", "v@test.md", "hash"))
            .unwrap()
            .id();

        let threads = PgThreadRepository::new(container.pool.clone());
        let title = Title::try_from("t1").unwrap();
        let thread = *threads
            .insert(&NewThread::new(&title), &[jora, valera])
            .unwrap()
            .id();

        Fixture {
            repo: PgMessageRepository::new(container.pool.clone()),
            threads,
            thread,
            jora,
            valera,
            _container: container,
        }
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_insert_unread_in_order() {
        let f = fixture().await;

        f.repo
            .insert(&NewMessage::new(&f.thread, &f.jora, "hello"))
            .unwrap();
        f.repo
            .insert(&NewMessage::new(&f.thread, &f.valera, "hi"))
            .unwrap();

        let messages = f.repo.find_by_thread(&f.thread).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert!(messages.iter().all(|m| !m.is_read));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_keep_insertion_order_for_equal_timestamps() {
        let f = fixture().await;
        let first = NewMessage::new(&f.thread, &f.jora, "first");
        let mut second = NewMessage::new(&f.thread, &f.valera, "second");
        second.created_at = first.created_at;

        f.repo.insert(&first).unwrap();
        f.repo.insert(&second).unwrap();

        let contents = f
            .repo
            .find_by_thread(&f.thread)
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>();
        assert_eq!(contents, ["first", "second"]);
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_mark_only_foreign_messages_read() {
        let f = fixture().await;
        f.repo
            .insert(&NewMessage::new(&f.thread, &f.jora, "hello"))
            .unwrap();
        f.repo
            .insert(&NewMessage::new(&f.thread, &f.valera, "hi"))
            .unwrap();

        let updated = f.repo.mark_as_read(&f.thread, &f.valera).unwrap();
        assert_eq!(updated, 1);

        let messages = f.repo.find_by_thread(&f.thread).unwrap();
        for m in messages {
            assert_eq!(m.is_read, m.sender == f.jora);
        }
        assert_eq!(f.repo.mark_as_read(&f.thread, &f.valera).unwrap(), 0);
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_count_unread_per_thread() {
        let f = fixture().await;
        f.repo
            .insert(&NewMessage::new(&f.thread, &f.jora, "one"))
            .unwrap();
        f.repo
            .insert(&NewMessage::new(&f.thread, &f.jora, "two"))
            .unwrap();

        let for_valera = f.repo.count_unread(&[f.thread], &f.valera).unwrap();
        assert_eq!(for_valera.get(&f.thread), Some(&2));

        let for_jora = f.repo.count_unread(&[f.thread], &f.jora).unwrap();
        assert!(for_jora.get(&f.thread).is_none());
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_cascade_on_thread_delete() {
        let f = fixture().await;
        f.repo
            .insert(&NewMessage::new(&f.thread, &f.jora, "hello"))
            .unwrap();

        f.threads.delete(&f.thread).unwrap();

        assert!(f.repo.find_by_thread(&f.thread).unwrap().is_empty());
    }
}
