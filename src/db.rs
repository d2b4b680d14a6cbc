use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbNote, DbUser, Note, User};
use crate::slug::slugify;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[instrument(skip_all, fields(username))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<i64, AppError> {
    info!("Creating new user");

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            username
        )));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    // Two racing registrations can both pass the pre-check; the UNIQUE
    // constraint on username is the source of truth.
    let res = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
        .bind(username)
        .bind(hashed_password)
        .execute(pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict(format!("Username '{}' already exists", username))
            } else {
                AppError::Database(err)
            }
        })?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn find_user_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, AppError> {
    info!("Getting user by username");
    let row =
        sqlx::query_as::<_, DbUser>("SELECT id, username, password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(User::from))
}

#[instrument(skip_all, fields(username))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    info!("Authenticating user");
    let row =
        sqlx::query_as::<_, DbUser>("SELECT id, username, password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    match row {
        Some(user) => {
            let hash = user.password.clone().unwrap_or_default();
            match bcrypt::verify(password, &hash) {
                Ok(true) => Ok(Some(User::from(user))),
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

#[instrument]
pub async fn create_note(
    pool: &Pool<Sqlite>,
    title: &str,
    content: &str,
) -> Result<i64, AppError> {
    info!("Creating note");
    let slug = slugify(title);
    let created_at = Utc::now().naive_utc();

    let res = sqlx::query(
        "INSERT INTO notes (title, content, slug, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(content)
    .bind(slug)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_all_notes(pool: &Pool<Sqlite>) -> Result<Vec<Note>, AppError> {
    info!("Getting all notes");
    let rows = sqlx::query_as::<_, DbNote>("SELECT * FROM notes")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Note::from).collect())
}

#[instrument]
pub async fn get_note(pool: &Pool<Sqlite>, id: i64) -> Result<Note, AppError> {
    info!("Getting note by ID");
    let row = sqlx::query_as::<_, DbNote>("SELECT * FROM notes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(note) => Ok(Note::from(note)),
        _ => Err(AppError::NotFound(format!(
            "Note with id {} not found in database",
            id
        ))),
    }
}

/// Mutates title and content in place. The slug and creation timestamp are
/// deliberately left untouched, matching create-time derivation semantics.
#[instrument]
pub async fn update_note(
    pool: &Pool<Sqlite>,
    id: i64,
    title: &str,
    content: &str,
) -> Result<(), AppError> {
    info!("Updating note");
    let res = sqlx::query("UPDATE notes SET title = ?, content = ? WHERE id = ?")
        .bind(title)
        .bind(content)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Note with id {} not found in database",
            id
        )));
    }

    Ok(())
}

#[instrument]
pub async fn delete_note(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting note");
    let res = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Note with id {} not found in database",
            id
        )));
    }

    Ok(())
}
