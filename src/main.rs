#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod slug;
mod telemetry;
#[cfg(test)]
mod test;

use api::{health, me, token};
use auth::{TokenService, unauthorized};
use config::AppConfig;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;
use routes::{
    all_notes, create, delete, index, login_form, logout, process_login, register, register_form,
    update, update_form,
};
use sqlx::SqlitePool;
use telemetry::{RequestLogFairing, init_tracing};
use tracing::{error, info};

#[launch]
async fn rocket() -> _ {
    init_tracing();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let pool = SqlitePool::connect(&config.database_url)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    init_rocket(pool, &config).await
}

pub async fn init_rocket(pool: SqlitePool, config: &AppConfig) -> Rocket<Build> {
    info!("Starting notekeeper");

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_minutes);

    rocket::build()
        .manage(pool)
        .manage(tokens)
        .mount(
            "/",
            routes![
                index,
                register_form,
                register,
                login_form,
                process_login,
                logout,
                token,
                all_notes,
                create,
                update_form,
                update,
                delete,
                me,
                health,
            ],
        )
        .register("/", catchers![unauthorized])
        .attach(Template::fairing())
        .attach(RequestLogFairing)
}
