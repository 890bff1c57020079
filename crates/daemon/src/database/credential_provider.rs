use async_trait::async_trait;
use sqlx::Row;

use common::auth::CredentialProvider;

use crate::database::Database;

#[async_trait]
impl CredentialProvider for Database {
    type Error = sqlx::Error;

    async fn insert(&self, username: &str, password_hash: &str) -> Result<bool, Self::Error> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO credentials (username, password_hash, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .execute(&**self)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn password_hash(&self, username: &str) -> Result<Option<String>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT password_hash
            FROM credentials
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| r.get("password_hash")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_is_first_writer_wins() {
        let db = Database::in_memory().await.unwrap();

        assert!(db.insert("alice", "hash-1").await.unwrap());
        assert!(!db.insert("alice", "hash-2").await.unwrap());

        assert_eq!(
            db.password_hash("alice").await.unwrap().as_deref(),
            Some("hash-1")
        );
    }

    #[tokio::test]
    async fn test_usernames_case_sensitive() {
        let db = Database::in_memory().await.unwrap();

        assert!(db.insert("alice", "lower").await.unwrap());
        assert!(db.insert("ALICE", "upper").await.unwrap());
        assert_eq!(db.password_hash("Alice").await.unwrap(), None);
    }
}
