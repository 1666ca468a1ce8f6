//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use homebase_core::{Money, Role, UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{User, UserStats};

const USER_COLUMNS: &str = "id, username, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    #[sqlx(flatten)]
    user: UserRow,
    bill_count: i64,
    total_cents: i64,
    unpaid_count: i64,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (username, password_hash, role, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        User::try_from(row)
    }

    /// All users ordered by username, with aggregate numbers over their bills.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_with_stats(&self) -> Result<Vec<UserStats>, RepositoryError> {
        let rows: Vec<StatsRow> = sqlx::query_as(
            r"
            SELECT u.id, u.username, u.role, u.created_at,
                   COUNT(b.id) AS bill_count,
                   COALESCE(SUM(b.amount_cents), 0) AS total_cents,
                   COUNT(CASE WHEN b.status = 'unpaid' THEN 1 END) AS unpaid_count
            FROM users u
            LEFT JOIN bills b ON b.user_id = u.id
            GROUP BY u.id
            ORDER BY u.username
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(UserStats {
                    user: User::try_from(r.user)?,
                    bill_count: r.bill_count,
                    total_amount: Money::from_cents(r.total_cents),
                    unpaid_count: r.unpaid_count,
                })
            })
            .collect()
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_role(&self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a user. Their bills are removed by the foreign key cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo.create(&name("alice"), "hash", Role::User).await.unwrap();
        assert_eq!(created.username.as_str(), "alice");
        assert_eq!(created.role, Role::User);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);

        let (user, hash) = repo.get_password_hash(&name("alice")).await.unwrap().unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(hash, "hash");

        let (user, _) = repo.get_password_hash(&name("ALICE")).await.unwrap().unwrap();
        assert_eq!(user.username.as_str(), "alice");

        assert!(repo.get_password_hash(&name("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&name("alice"), "hash", Role::User).await.unwrap();
        let err = repo
            .create(&name("alice"), "other", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let err = repo
            .create(&name("Alice"), "other", Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_role_and_delete() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo.create(&name("carol"), "hash", Role::User).await.unwrap();
        repo.update_role(user.id, Role::Admin).await.unwrap();
        assert_eq!(
            repo.get_by_id(user.id).await.unwrap().unwrap().role,
            Role::Admin
        );

        repo.delete(user.id).await.unwrap();
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(user.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.update_role(user.id, Role::User).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_with_stats_includes_users_without_bills() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&name("zed"), "hash", Role::User).await.unwrap();
        repo.create(&name("amy"), "hash", Role::Admin).await.unwrap();

        let stats = repo.list_with_stats().await.unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.user.username.as_str()).collect();
        assert_eq!(names, ["amy", "zed"]);
        assert!(stats.iter().all(|s| s.bill_count == 0));
        assert!(stats.iter().all(|s| s.total_amount.is_zero()));
    }
}
