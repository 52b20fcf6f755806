use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;
use diesel::result::DatabaseErrorKind;

use crate::integration::db::Pool;
use crate::schema::users;

use super::Id;
use super::Username;
use super::model::NewUser;
use super::model::User;

pub trait UserRepository {
    fn insert(&self, user: &NewUser) -> super::Result<User>;

    fn find_by_id(&self, id: &Id) -> super::Result<User>;

    fn find_by_username(&self, username: &Username) -> super::Result<User>;
}

pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn insert(&self, u: &NewUser) -> super::Result<User> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(users::table)
            .values(u)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::AlreadyExists(Username::new(u.username))
                }
                e => e.into(),
            })
    }

    fn find_by_id(&self, id: &Id) -> super::Result<User> {
        let mut conn = self.pool.get()?;

        users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::UnknownId(*id))
    }

    fn find_by_username(&self, username: &Username) -> super::Result<User> {
        let mut conn = self.pool.get()?;

        users::table
            .filter(users::username.eq(username.as_str()))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| super::Error::NotFound(username.clone()))
    }
}

#[cfg(test)]
mod test {
    use crate::integration::db::tests::TestContainer;

    use super::*;

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_insert_and_find() {
        let container = TestContainer::init().await;
        let repo = PgUserRepository::new(container.pool.clone());

        let inserted = repo
            .insert(&NewUser::new("jora", "jora@test.md", "hash"))
            .unwrap();

        let by_id = repo.find_by_id(inserted.id()).unwrap();
        assert_eq!(by_id.username(), "jora");

        let by_name = repo.find_by_username(&Username::new("jora")).unwrap();
        assert_eq!(by_name.id(), inserted.id());
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_reject_duplicate_username() {
        let container = TestContainer::init().await;
        let repo = PgUserRepository::new(container.pool.clone());

        repo.insert(&NewUser::new("valera", "v@test.md", "hash"))
            .unwrap();
        let result = repo.insert(&NewUser::new("valera", "other@test.md", "hash"));

        assert!(matches!(result, Err(super::super::Error::AlreadyExists(_))));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_not_find_unknown_user() {
        let container = TestContainer::init().await;
        let repo = PgUserRepository::new(container.pool.clone());

        let result = repo.find_by_username(&Username::new("radu"));

        assert!(matches!(result, Err(super::super::Error::NotFound(_))));
    }
}
