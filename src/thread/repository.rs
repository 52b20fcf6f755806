use chrono::Utc;
use diesel::Connection;
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::result::DatabaseErrorKind;

use crate::integration::db::Pool;
use crate::schema::{threads, threads_users};
use crate::user;

use super::model::{NewThread, NewThreadUser, Thread};
use super::{Id, MAX_PARTICIPANTS, Title};

pub trait ThreadRepository {
    /// Inserts the thread together with its initial members, all or nothing.
    fn insert(&self, thread: &NewThread, members: &[user::Id]) -> super::Result<Thread>;

    fn find_all(&self) -> super::Result<Vec<Thread>>;

    fn find_by_title(&self, title: &Title) -> super::Result<Option<Thread>>;

    fn find_by_member(&self, member: &user::Id) -> super::Result<Vec<Thread>>;

    fn find_members(&self, id: &Id) -> super::Result<Vec<user::Id>>;

    /// Adds `member` only while the thread has fewer than two members.
    /// The check and the insert happen in one atomic unit.
    fn add_member(&self, id: &Id, member: &user::Id) -> super::Result<Thread>;

    fn delete(&self, id: &Id) -> super::Result<bool>;
}

pub struct PgThreadRepository {
    pool: Pool,
}

impl PgThreadRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl ThreadRepository for PgThreadRepository {
    fn insert(&self, t: &NewThread, members: &[user::Id]) -> super::Result<Thread> {
        if members.len() > MAX_PARTICIPANTS {
            return Err(super::Error::ParticipantLimit);
        }
        let mut conn = self.pool.get()?;

        conn.transaction::<_, super::Error, _>(|conn| {
            let thread = diesel::insert_into(threads::table)
                .values(t)
                .returning(Thread::as_returning())
                .get_result(conn)
                .map_err(|e| match e {
                    diesel::result::Error::DatabaseError(
                        DatabaseErrorKind::UniqueViolation,
                        _,
                    ) => super::Error::AlreadyExists,
                    e => e.into(),
                })?;

            let rows = members
                .iter()
                .map(|m| NewThreadUser::new(thread.id(), m))
                .collect::<Vec<_>>();
            diesel::insert_into(threads_users::table)
                .values(&rows)
                .execute(conn)?;

            Ok(thread)
        })
    }

    fn find_all(&self) -> super::Result<Vec<Thread>> {
        let mut conn = self.pool.get()?;

        let threads = threads::table
            .order(threads::created_at.asc())
            .select(Thread::as_select())
            .load(&mut conn)?;

        Ok(threads)
    }

    fn find_by_title(&self, title: &Title) -> super::Result<Option<Thread>> {
        let mut conn = self.pool.get()?;

        let thread = threads::table
            .filter(threads::title.eq(title.as_str()))
            .select(Thread::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(thread)
    }

    fn find_by_member(&self, member: &user::Id) -> super::Result<Vec<Thread>> {
        let mut conn = self.pool.get()?;

        let threads = threads::table
            .inner_join(threads_users::table)
            .filter(threads_users::user_id.eq(member))
            .order(threads::created_at.asc())
            .select(Thread::as_select())
            .load(&mut conn)?;

        Ok(threads)
    }

    fn find_members(&self, id: &Id) -> super::Result<Vec<user::Id>> {
        let mut conn = self.pool.get()?;

        let members = threads_users::table
            .filter(threads_users::thread_id.eq(id))
            .select(threads_users::user_id)
            .load(&mut conn)?;

        Ok(members)
    }

    fn add_member(&self, id: &Id, member: &user::Id) -> super::Result<Thread> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, super::Error, _>(|conn| {
            // row lock serializes concurrent joins to the same thread
            threads::table
                .find(id)
                .select(threads::id)
                .for_update()
                .first::<Id>(conn)?;

            let members = threads_users::table
                .filter(threads_users::thread_id.eq(id))
                .select(threads_users::user_id)
                .load::<user::Id>(conn)?;

            if members.contains(member) {
                return Err(super::Error::AlreadyParticipant);
            }
            if members.len() >= MAX_PARTICIPANTS {
                return Err(super::Error::ParticipantLimit);
            }

            diesel::insert_into(threads_users::table)
                .values(NewThreadUser::new(id, member))
                .execute(conn)?;

            let thread = diesel::update(threads::table.find(id))
                .set(threads::updated_at.eq(Utc::now().naive_utc()))
                .returning(Thread::as_returning())
                .get_result(conn)?;

            Ok(thread)
        })
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(threads::table.find(id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
