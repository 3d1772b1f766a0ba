use async_trait::async_trait;
use sqlx::{mysql::MySqlRow, Row};

use crate::auth::repo_types::UserRecord;
use crate::db::{row_to_json, Db, Param, StoreError};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All rows whose email equals `email` exactly, in store order.
    async fn find_by_email(&self, email: &str) -> Result<Vec<UserRecord>, StoreError>;
}

#[derive(Clone)]
pub struct MySqlCredentialStore {
    db: Db,
}

impl MySqlCredentialStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Vec<UserRecord>, StoreError> {
        let rows = self
            .db
            .query(
                "SELECT * FROM login WHERE email = ?",
                &[Param::Text(email.to_owned())],
            )
            .await?;
        rows.iter().map(user_from_row).collect()
    }
}

fn user_from_row(row: &MySqlRow) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        email: row.try_get_unchecked::<String, _>("email")?,
        password: row.try_get_unchecked::<Vec<u8>, _>("password")?,
        columns: row_to_json(row, &["email", "password"])?,
    })
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    /// Store backed by a fixed list of rows.
    #[derive(Default)]
    pub struct MemoryStore {
        pub rows: Vec<UserRecord>,
    }

    impl MemoryStore {
        pub fn with_user(mut self, user: UserRecord) -> Self {
            self.rows.push(user);
            self
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn find_by_email(&self, email: &str) -> Result<Vec<UserRecord>, StoreError> {
            Ok(self
                .rows
                .iter()
                .filter(|u| u.email == email)
                .cloned()
                .collect())
        }
    }

    /// Store that fails every lookup.
    pub struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn find_by_email(&self, _email: &str) -> Result<Vec<UserRecord>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mysql_store_reports_not_connected_without_pool() {
        let store = MySqlCredentialStore::new(Db::disconnected());
        let err = store.find_by_email("u@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::NotConnected));
    }
}
