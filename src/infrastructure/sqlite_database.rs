use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row};
use std::str::FromStr;
use tracing::info;

use crate::core::{MediaId, TweetId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{constraint_violation, ConstraintViolation, DatabaseInterface};
use crate::models::{
    AttachmentRow, LikeRow, Media, Tweet, TweetFilter, TweetRow, TweetRows, User, UserGraph,
    UserRef,
};

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        api_key TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS follows (
        follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        followee_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        PRIMARY KEY (follower_id, followee_id),
        CHECK (follower_id <> followee_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tweets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS medias (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        tweet_id INTEGER REFERENCES tweets(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS likes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        tweet_id INTEGER NOT NULL REFERENCES tweets(id) ON DELETE CASCADE,
        UNIQUE (user_id, tweet_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id)",
    "CREATE INDEX IF NOT EXISTS idx_tweets_author ON tweets(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_medias_tweet ON medias(tweet_id)",
    "CREATE INDEX IF NOT EXISTS idx_likes_tweet ON likes(tweet_id)",
];

/// SQLite implementation of the entity store, also used in-memory for tests
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::DatabaseError(format!("Invalid SQLite URL {}: {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self { pool })
    }

    /// Fresh, initialized in-memory database.
    /// A single long-lived connection keeps every query on the same database.
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::DatabaseError(format!("Invalid SQLite URL: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }
}

fn sqlite_user(row: &SqliteRow) -> User {
    User {
        id: UserId(row.get("id")),
        name: row.get("name"),
        api_key: row.get("api_key"),
        password_hash: row.get("password_hash"),
    }
}

fn sqlite_user_ref(row: &SqliteRow) -> UserRef {
    UserRef {
        id: UserId(row.get("id")),
        name: row.get("name"),
    }
}

#[async_trait]
impl DatabaseInterface for SqliteDatabase {
    async fn initialize(&self) -> AppResult<()> {
        for statement in SQLITE_SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create schema: {}", e)))?;
        }
        info!("SQLite schema ready");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_user(&self, name: &str, api_key: &str, password_hash: &str) -> AppResult<User> {
        let result =
            sqlx::query("INSERT INTO users (name, api_key, password_hash) VALUES (?, ?, ?)")
                .bind(name)
                .bind(api_key)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| match constraint_violation(&e) {
                    Some(ConstraintViolation::Unique) => AppError::DuplicateApiKey,
                    _ => AppError::DatabaseError(format!("Failed to create user: {}", e)),
                })?;

        Ok(User {
            id: UserId(result.last_insert_rowid()),
            name: name.to_string(),
            api_key: api_key.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, api_key, password_hash FROM users WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user {}: {}", id, e)))?;
        Ok(row.as_ref().map(sqlite_user))
    }

    async fn get_user_by_api_key(&self, api_key: &str) -> AppResult<Option<User>> {
        let row =
            sqlx::query("SELECT id, name, api_key, password_hash FROM users WHERE api_key = ?")
                .bind(api_key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to resolve API key: {}", e)))?;
        Ok(row.as_ref().map(sqlite_user))
    }

    async fn create_follow(&self, follower: UserId, followee: UserId) -> AppResult<()> {
        sqlx::query("INSERT INTO follows (follower_id, followee_id) VALUES (?, ?)")
            .bind(follower.value())
            .bind(followee.value())
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::Unique) => AppError::DuplicateFollow(followee),
                Some(ConstraintViolation::ForeignKey) => AppError::NoSuchUser(followee),
                Some(ConstraintViolation::Check) => AppError::SelfFollow,
                None => AppError::DatabaseError(format!("Failed to create follow: {}", e)),
            })?;
        Ok(())
    }

    async fn delete_follow(&self, follower: UserId, followee: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
            .bind(follower.value())
            .bind(followee.value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete follow: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_user_graph(&self, id: UserId) -> AppResult<Option<UserGraph>> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query("SELECT id, name, api_key, password_hash FROM users WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(user) = user.as_ref().map(sqlite_user) else {
            return Ok(None);
        };

        let followers = sqlx::query(
            "SELECT u.id, u.name FROM follows f JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = ? ORDER BY u.id",
        )
        .bind(id.value())
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(sqlite_user_ref)
        .collect();

        let following = sqlx::query(
            "SELECT u.id, u.name FROM follows f JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = ? ORDER BY u.id",
        )
        .bind(id.value())
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(sqlite_user_ref)
        .collect();

        tx.commit().await?;
        Ok(Some(UserGraph {
            user,
            followers,
            following,
        }))
    }

    async fn create_tweet(&self, author: UserId, content: &str) -> AppResult<TweetId> {
        let result = sqlx::query("INSERT INTO tweets (author_id, content) VALUES (?, ?)")
            .bind(author.value())
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::ForeignKey) => AppError::NoSuchUser(author),
                _ => AppError::DatabaseError(format!("Failed to create tweet: {}", e)),
            })?;
        Ok(TweetId(result.last_insert_rowid()))
    }

    async fn get_tweet(&self, id: TweetId) -> AppResult<Option<Tweet>> {
        let row = sqlx::query("SELECT id, author_id, content FROM tweets WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get tweet {}: {}", id, e)))?;
        Ok(row.map(|row| Tweet {
            id: TweetId(row.get("id")),
            author_id: UserId(row.get("author_id")),
            content: row.get("content"),
        }))
    }

    async fn delete_tweet(&self, id: TweetId, author: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = ? AND author_id = ?")
            .bind(id.value())
            .bind(author.value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete tweet {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_media(&self, name: &str) -> AppResult<MediaId> {
        let result = sqlx::query("INSERT INTO medias (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create media: {}", e)))?;
        Ok(MediaId(result.last_insert_rowid()))
    }

    async fn get_media(&self, id: MediaId) -> AppResult<Option<Media>> {
        let row = sqlx::query("SELECT id, name, tweet_id FROM medias WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get media {}: {}", id, e)))?;
        Ok(row.map(|row| Media {
            id: MediaId(row.get("id")),
            name: row.get("name"),
            tweet_id: row.get::<Option<i64>, _>("tweet_id").map(TweetId),
        }))
    }

    async fn attach_media(&self, tweet: TweetId, media_ids: &[MediaId]) -> AppResult<Vec<MediaId>> {
        let mut tx = self.pool.begin().await?;
        let mut attached = Vec::with_capacity(media_ids.len());

        for media_id in media_ids {
            let result =
                sqlx::query("UPDATE medias SET tweet_id = ? WHERE id = ? AND tweet_id IS NULL")
                    .bind(tweet.value())
                    .bind(media_id.value())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| match constraint_violation(&e) {
                        Some(ConstraintViolation::ForeignKey) => AppError::NoSuchTweet(tweet),
                        _ => AppError::DatabaseError(format!(
                            "Failed to attach media {}: {}",
                            media_id, e
                        )),
                    })?;
            if result.rows_affected() > 0 {
                attached.push(*media_id);
            }
        }

        tx.commit().await?;
        Ok(attached)
    }

    async fn create_like(&self, user: UserId, tweet: TweetId) -> AppResult<()> {
        sqlx::query("INSERT INTO likes (user_id, tweet_id) VALUES (?, ?)")
            .bind(user.value())
            .bind(tweet.value())
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::Unique) => AppError::DuplicateLike(tweet),
                Some(ConstraintViolation::ForeignKey) => AppError::NoSuchTweet(tweet),
                _ => AppError::DatabaseError(format!("Failed to create like: {}", e)),
            })?;
        Ok(())
    }

    async fn delete_like(&self, user: UserId, tweet: TweetId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND tweet_id = ?")
            .bind(user.value())
            .bind(tweet.value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete like: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_tweets(&self, filter: TweetFilter) -> AppResult<TweetRows> {
        let mut tx = self.pool.begin().await?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT t.id, t.content, t.author_id, u.name AS author_name
             FROM tweets t JOIN users u ON u.id = t.author_id WHERE t.",
        );
        push_tweet_filter(&mut qb, filter);
        qb.push(" ORDER BY t.id");

        let tweets: Vec<TweetRow> = qb
            .build()
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| TweetRow {
                id: TweetId(row.get("id")),
                content: row.get("content"),
                author_id: UserId(row.get("author_id")),
                author_name: row.get("author_name"),
            })
            .collect();

        if tweets.is_empty() {
            tx.commit().await?;
            return Ok(TweetRows::default());
        }

        // Associations are selected through the same filter, so the number of
        // bound parameters stays constant however many tweets matched
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT tweet_id, name FROM medias
             WHERE tweet_id IN (SELECT id FROM tweets WHERE ",
        );
        push_tweet_filter(&mut qb, filter);
        qb.push(") ORDER BY id");

        let attachments = qb
            .build()
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| AttachmentRow {
                tweet_id: TweetId(row.get("tweet_id")),
                name: row.get("name"),
            })
            .collect();

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT l.tweet_id, l.user_id, u.name FROM likes l JOIN users u ON u.id = l.user_id
             WHERE l.tweet_id IN (SELECT id FROM tweets WHERE ",
        );
        push_tweet_filter(&mut qb, filter);
        qb.push(") ORDER BY l.id");

        let likes = qb
            .build()
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| LikeRow {
                tweet_id: TweetId(row.get("tweet_id")),
                user_id: UserId(row.get("user_id")),
                name: row.get("name"),
            })
            .collect();

        tx.commit().await?;
        Ok(TweetRows {
            tweets,
            attachments,
            likes,
        })
    }
}

/// Condition on a `tweets` row, without table qualifier
fn push_tweet_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: TweetFilter) {
    match filter {
        TweetFilter::ById(id) => {
            qb.push("id = ");
            qb.push_bind(id.value());
        }
        TweetFilter::ByAuthor(author) => {
            qb.push("author_id = ");
            qb.push_bind(author.value());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        db.initialize().await.unwrap();
        db.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_constraint_translation() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let alice = db.create_user("alice", "key-a", "hash").await.unwrap();
        let bob = db.create_user("bob", "key-b", "hash").await.unwrap();
        assert_eq!(db.get_user(alice.id).await.unwrap(), Some(alice.clone()));
        assert!(db.get_user(UserId::new(999)).await.unwrap().is_none());

        assert!(matches!(
            db.create_user("alice again", "key-a", "hash").await,
            Err(AppError::DuplicateApiKey)
        ));

        db.create_follow(alice.id, bob.id).await.unwrap();
        assert!(matches!(
            db.create_follow(alice.id, bob.id).await,
            Err(AppError::DuplicateFollow(id)) if id == bob.id
        ));
        assert!(matches!(
            db.create_follow(alice.id, alice.id).await,
            Err(AppError::SelfFollow)
        ));
        assert!(matches!(
            db.create_follow(alice.id, UserId::new(999)).await,
            Err(AppError::NoSuchUser(_))
        ));

        let tweet = db.create_tweet(bob.id, "hi").await.unwrap();
        db.create_like(alice.id, tweet).await.unwrap();
        assert!(matches!(
            db.create_like(alice.id, tweet).await,
            Err(AppError::DuplicateLike(_))
        ));
        assert!(matches!(
            db.create_like(alice.id, TweetId::new(999)).await,
            Err(AppError::NoSuchTweet(_))
        ));
    }

    #[tokio::test]
    async fn test_tweet_delete_cascades() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let alice = db.create_user("alice", "key-a", "hash").await.unwrap();
        let tweet = db.create_tweet(alice.id, "with picture").await.unwrap();
        let media = db.create_media("/media_files/cat.png").await.unwrap();
        assert_eq!(db.attach_media(tweet, &[media]).await.unwrap(), vec![media]);
        db.create_like(alice.id, tweet).await.unwrap();

        assert!(!db.delete_tweet(tweet, UserId::new(999)).await.unwrap());
        assert!(db.delete_tweet(tweet, alice.id).await.unwrap());

        assert!(db.get_tweet(tweet).await.unwrap().is_none());
        assert!(db.get_media(media).await.unwrap().is_none());
        assert!(!db.delete_like(alice.id, tweet).await.unwrap());
    }

    #[tokio::test]
    async fn test_load_tweets_batches_associations() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let alice = db.create_user("alice", "key-a", "hash").await.unwrap();
        let bob = db.create_user("bob", "key-b", "hash").await.unwrap();
        let first = db.create_tweet(alice.id, "first").await.unwrap();
        let second = db.create_tweet(alice.id, "second").await.unwrap();
        db.create_tweet(bob.id, "not alice").await.unwrap();
        let media = db.create_media("/media_files/a.png").await.unwrap();
        db.attach_media(second, &[media]).await.unwrap();
        db.create_like(bob.id, first).await.unwrap();

        let rows = db.load_tweets(TweetFilter::ByAuthor(alice.id)).await.unwrap();
        let ids: Vec<TweetId> = rows.tweets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(rows.attachments.len(), 1);
        assert_eq!(rows.attachments[0].tweet_id, second);
        assert_eq!(rows.likes.len(), 1);
        assert_eq!(rows.likes[0].name, "bob");

        let empty = db.load_tweets(TweetFilter::ById(TweetId::new(999))).await.unwrap();
        assert!(empty.tweets.is_empty());
    }

    #[tokio::test]
    async fn test_load_tweets_for_prolific_author() {
        // More tweets than SQLite allows bound parameters in one statement
        const TWEETS: i64 = 33_000;

        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let author = db.create_user("author", "key-a", "hash").await.unwrap();
        let fan = db.create_user("fan", "key-f", "hash").await.unwrap();
        sqlx::query(
            "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?)
             INSERT INTO tweets (author_id, content) SELECT ?, 'tweet ' || n FROM seq",
        )
        .bind(TWEETS)
        .bind(author.id.value())
        .execute(&db.pool)
        .await
        .unwrap();

        let last = db.create_tweet(author.id, "latest").await.unwrap();
        let media = db.create_media("/media_files/latest.png").await.unwrap();
        db.attach_media(last, &[media]).await.unwrap();
        db.create_like(fan.id, last).await.unwrap();

        let rows = db.load_tweets(TweetFilter::ByAuthor(author.id)).await.unwrap();
        assert_eq!(rows.tweets.len() as i64, TWEETS + 1);
        assert_eq!(rows.tweets.last().map(|t| t.id), Some(last));
        assert_eq!(rows.attachments.len(), 1);
        assert_eq!(rows.attachments[0].tweet_id, last);
        assert_eq!(rows.likes.len(), 1);
        assert_eq!(rows.likes[0].user_id, fan.id);
    }
}
