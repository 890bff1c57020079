use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use common::catalog::{
    fold_case, CatalogError, CatalogProvider, ImageFilter, ImageId, ImageName, ImageRecord,
    UserEntry,
};

use crate::database::Database;

type Result<T> = std::result::Result<T, CatalogError<sqlx::Error>>;

fn image_from_row(row: &SqliteRow) -> ImageRecord {
    ImageRecord {
        id: ImageId::from(row.get::<String, _>("id")),
        src: row.get("src"),
        name: row.get("name"),
        owner_id: row.get("owner_id"),
    }
}

#[async_trait]
impl CatalogProvider for Database {
    type Error = sqlx::Error;

    async fn select_images(&self, filter: &ImageFilter) -> Result<Vec<ImageRecord>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, src, name, owner_id FROM images WHERE 1 = 1");

        if let Some(pattern) = filter.like_pattern() {
            query
                .push(" AND name_folded LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
        }
        if let Some(owner) = &filter.owner {
            query.push(" AND owner_id = ").push_bind(owner.clone());
        }
        query.push(" ORDER BY seq");

        let rows = query.build().fetch_all(&**self).await?;
        Ok(rows.iter().map(image_from_row).collect())
    }

    async fn select_users(&self, ids: &[String]) -> Result<Vec<UserEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, username, email FROM users WHERE id IN (");
        let mut list = query.separated(", ");
        for id in ids {
            list.push_bind(id.as_str());
        }
        list.push_unseparated(")");

        let rows = query.build().fetch_all(&**self).await?;
        Ok(rows
            .iter()
            .map(|r| UserEntry {
                id: r.get("id"),
                username: r.get("username"),
                email: r.get("email"),
            })
            .collect())
    }

    async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord> {
        let row = sqlx::query(
            r#"
            SELECT id, src, name, owner_id
            FROM images
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&**self)
        .await?;

        row.as_ref()
            .map(image_from_row)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn insert_image(&self, record: &ImageRecord) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO images (id, src, name, name_folded, owner_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.src)
        .bind(&record.name)
        .bind(fold_case(&record.name))
        .bind(&record.owner_id)
        .bind(now)
        .execute(&**self)
        .await?;
        Ok(())
    }

    async fn rename_by_id(&self, id: &ImageId, name: &ImageName) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE images SET name = ?, name_folded = ? WHERE id = ?
            "#,
        )
        .bind(name.as_str())
        .bind(fold_case(name.as_str()))
        .bind(id.as_str())
        .execute(&**self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn add_user(&self, entry: &UserEntry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.username)
        .bind(&entry.email)
        .execute(&**self)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use common::catalog::{MemoryCatalogProvider, UNKNOWN_EMAIL, UNKNOWN_USERNAME};

    use super::*;

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.add_user(&UserEntry::new("alice", "alice", "alice@example.com"))
            .await
            .unwrap();
        for (name, owner) in [
            ("a.b", "alice"),
            ("axb", "alice"),
            ("100%_done", "alice"),
            ("1000 done", "ghost"),
            ("Sunset", "ghost"),
        ] {
            db.create(&ImageName::parse(name).unwrap(), owner, "/uploads/x.png")
                .await
                .unwrap();
        }
        db
    }

    fn names(views: &[common::catalog::ImageView]) -> Vec<&str> {
        views.iter().map(|v| v.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_like_metacharacters_are_literal() {
        let db = seeded().await;

        let views = db.list(&ImageFilter::new(Some("a.b"), None)).await.unwrap();
        assert_eq!(names(&views), vec!["a.b"]);

        let views = db.list(&ImageFilter::new(Some("0%_"), None)).await.unwrap();
        assert_eq!(names(&views), vec!["100%_done"]);
    }

    #[tokio::test]
    async fn test_substring_ignores_case() {
        let db = seeded().await;
        let views = db.list(&ImageFilter::new(Some("sUnS"), None)).await.unwrap();
        assert_eq!(names(&views), vec!["Sunset"]);
    }

    #[tokio::test]
    async fn test_substring_folds_non_ascii_case() {
        let db = seeded().await;
        let memory = MemoryCatalogProvider::new();
        let name = ImageName::parse("Émile Café").unwrap();
        db.create(&name, "alice", "/uploads/e.png").await.unwrap();
        memory.create(&name, "alice", "/uploads/e.png").await.unwrap();

        for needle in ["émile", "ÉMILE", "CAFÉ"] {
            let filter = ImageFilter::new(Some(needle), None);
            let stored = db.list(&filter).await.unwrap();
            assert_eq!(names(&stored), vec!["Émile Café"], "needle {}", needle);
            assert_eq!(memory.list(&filter).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_rename_refreshes_folded_name() {
        let db = seeded().await;
        let record = db
            .create(&ImageName::parse("Straße").unwrap(), "alice", "/uploads/s.png")
            .await
            .unwrap();
        db.rename_by_id(&record.id, &ImageName::parse("ÜBER").unwrap())
            .await
            .unwrap();

        let filter = ImageFilter::new(Some("über"), None);
        assert_eq!(names(&db.list(&filter).await.unwrap()), vec!["ÜBER"]);
        let filter = ImageFilter::new(Some("straße"), None);
        assert!(db.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_left_join_keeps_ghost_owned_records() {
        let db = seeded().await;
        let views = db.list(&ImageFilter::all()).await.unwrap();
        assert_eq!(views.len(), 5);

        let sunset = views.iter().find(|v| v.name == "Sunset").unwrap();
        assert_eq!(sunset.author.id, "ghost");
        assert_eq!(sunset.author.username, UNKNOWN_USERNAME);
        assert_eq!(sunset.author.email, UNKNOWN_EMAIL);

        let ab = views.iter().find(|v| v.name == "a.b").unwrap();
        assert_eq!(ab.author.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_owner_and_substring_compose() {
        let db = seeded().await;
        let views = db
            .list(&ImageFilter::new(Some("done"), Some("ghost")))
            .await
            .unwrap();
        assert_eq!(names(&views), vec!["1000 done"]);
    }

    #[tokio::test]
    async fn test_rename_counts_and_not_found() {
        let db = seeded().await;
        let record = db
            .create(&ImageName::parse("before").unwrap(), "alice", "/uploads/b.png")
            .await
            .unwrap();

        let name = ImageName::parse("after").unwrap();
        assert_eq!(db.rename_by_id(&record.id, &name).await.unwrap(), 1);
        assert_eq!(
            db.rename_by_id(&ImageId::from("missing"), &name)
                .await
                .unwrap(),
            0
        );
        assert_eq!(db.get_by_id(&record.id).await.unwrap().name, "after");
        assert!(matches!(
            db.get_by_id(&ImageId::from("missing")).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_name_length_enforced_by_schema() {
        let db = Database::in_memory().await.unwrap();
        let record = ImageRecord {
            id: ImageId::generate(),
            src: String::new(),
            name: "x".repeat(101),
            owner_id: "alice".into(),
        };
        assert!(db.insert_image(&record).await.is_err());
    }
}
