#[cfg(test)]
pub mod test_db {
    use std::collections::HashMap;
    use std::sync::Once;

    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};

    use crate::db::{create_note, create_user};
    use crate::error::AppError;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        notes: Vec<TestNote>,
    }

    pub struct TestUser {
        pub username: String,
        pub password: String,
    }

    pub struct TestNote {
        pub title: String,
        pub content: String,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(mut self, username: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn user_with_password(mut self, username: &str, password: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                password: password.to_string(),
            });
            self
        }

        pub fn note(mut self, title: &str, content: &str) -> Self {
            self.notes.push(TestNote {
                title: title.to_string(),
                content: content.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = tracing_subscriber::fmt()
                    .with_test_writer()
                    .with_env_filter("info")
                    .try_init();
            });

            // One connection keeps every query on the same in-memory database
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut note_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let user_id = create_user(&pool, &user.username, &user.password).await?;
                user_id_map.insert(user.username.clone(), user_id);
            }

            for note in &self.notes {
                let note_id = create_note(&pool, &note.title, &note.content).await?;
                note_id_map.insert(note.title.clone(), note_id);
            }

            Ok(TestDb {
                pool,
                user_id_map,
                note_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub note_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, username: &str) -> Option<i64> {
            self.user_id_map.get(username).copied()
        }

        pub fn note_id(&self, title: &str) -> Option<i64> {
            self.note_id_map.get(title).copied()
        }

        pub async fn note_count(&self) -> Result<i64, sqlx::Error> {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes")
                .fetch_one(&self.pool)
                .await
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite};

    use crate::config::AppConfig;
    use crate::init_rocket;

    pub static TEST_SECRET: &str = "test_signing_secret";

    pub fn test_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            token_ttl_minutes: 30,
        }
    }

    pub async fn setup_test_client(pool: Pool<Sqlite>) -> Client {
        let rocket = init_rocket(pool, &test_config()).await;

        Client::tracked(rocket)
            .await
            .expect("Failed to build test client")
    }
}
