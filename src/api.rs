use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use serde_json::{Value, json};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::auth::{CurrentUser, TokenService};
use crate::db::authenticate_user;
use crate::error::AppError;

/// OAuth2 password-grant style form body.
#[derive(FromForm)]
pub struct TokenRequestForm {
    username: String,
    password: String,
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Serialize, Deserialize)]
pub struct MeResponse {
    pub username: String,
}

fn problem(status: Status, message: &str) -> Custom<Json<Value>> {
    Custom(
        status,
        Json(json!({
            "error": status.reason_lossy(),
            "message": message,
        })),
    )
}

#[post("/token", data = "<form>")]
pub async fn token(
    form: Form<TokenRequestForm>,
    db: &State<Pool<Sqlite>>,
    tokens: &State<TokenService>,
) -> Result<Json<TokenResponse>, Custom<Json<Value>>> {
    info!("Token request: {}", &form.username);

    let user = authenticate_user(db, &form.username, &form.password)
        .await
        .map_err(|err| {
            let status = err.to_status_with_log("Token request");
            problem(status, "Could not authenticate")
        })?;

    let user = match user {
        Some(user) => user,
        _ => {
            return Err(problem(
                Status::Unauthorized,
                "Invalid username or password",
            ));
        }
    };

    let access_token = tokens.issue(&user.username).map_err(|err: AppError| {
        let status = err.to_status_with_log("Token issuance");
        problem(status, "Could not issue token")
    })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[get("/me")]
pub fn me(user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
    })
}

#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
