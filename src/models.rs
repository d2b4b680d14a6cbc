use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i64>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbNote {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub user_id: Option<i64>,
}

impl From<DbNote> for Note {
    fn from(db: DbNote) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            content: db.content.unwrap_or_default(),
            slug: db.slug.unwrap_or_default(),
            created_at: db
                .created_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
            user_id: db.user_id,
        }
    }
}

#[derive(Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
        }
    }
}
