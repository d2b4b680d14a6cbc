use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{Value, json};

use super::TokenService;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// The caller a verified bearer token asserts. Resolved from the
/// `access_token` cookie first, falling back to an `Authorization: Bearer`
/// header; requests carrying neither, or an invalid token, are 401.
pub struct CurrentUser {
    pub username: String,
}

fn bearer_token<'r>(request: &'r Request<'_>) -> Option<&'r str> {
    request
        .headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = request
            .cookies()
            .get(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| bearer_token(request).map(String::from));

        let Some(token) = token else {
            tracing::warn!("Request carried no access token");
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let tokens = match request.rocket().state::<TokenService>() {
            Some(tokens) => tokens,
            _ => {
                tracing::error!("Token service not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        match tokens.verify(&token) {
            Ok(username) => {
                tracing::info!(username = %username, "User authenticated via access token");
                Outcome::Success(CurrentUser { username })
            }
            Err(err) => {
                err.log("Access token verification");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unauthorized",
        "message": "Could not validate credentials"
    });

    Custom(Status::Unauthorized, Json(error_json))
}
