use rocket::State;
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::response::Redirect;
use rocket_dyn_templates::{Template, context};
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

use crate::auth::{ACCESS_TOKEN_COOKIE, TokenService};
use crate::db::{
    authenticate_user, create_note, create_user, delete_note, get_all_notes, get_note, update_note,
};

#[derive(FromForm)]
pub struct CredentialsForm {
    username: String,
    password: String,
}

#[derive(FromForm)]
pub struct NoteForm {
    title: String,
    content: String,
}

#[get("/")]
pub fn index() -> Template {
    Template::render(
        "index",
        context! {
            title: "Notekeeper",
        },
    )
}

#[get("/register")]
pub fn register_form() -> Template {
    Template::render(
        "register",
        context! {
            title: "Register - Notekeeper",
        },
    )
}

#[post("/register", data = "<form>")]
pub async fn register(
    form: Form<CredentialsForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, Status> {
    info!("Registration attempt: {}", &form.username);

    create_user(db, &form.username, &form.password).await?;

    Ok(Redirect::to(uri!(all_notes)))
}

#[get("/login")]
pub fn login_form() -> Template {
    Template::render(
        "login",
        context! {
            title: "Login - Notekeeper",
        },
    )
}

#[post("/login", data = "<form>")]
pub async fn process_login(
    form: Form<CredentialsForm>,
    db: &State<Pool<Sqlite>>,
    tokens: &State<TokenService>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Status> {
    info!("Login attempt: {}", &form.username);

    let user = match authenticate_user(db, &form.username, &form.password).await? {
        Some(user) => user,
        _ => {
            warn!("Invalid credentials for {}", &form.username);
            return Err(Status::BadRequest);
        }
    };

    let token = tokens.issue(&user.username)?;
    cookies.add(
        Cookie::build((ACCESS_TOKEN_COOKIE, token))
            .same_site(SameSite::Lax)
            .http_only(true),
    );

    Ok(Redirect::to(uri!(all_notes)))
}

#[get("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove(Cookie::build(ACCESS_TOKEN_COOKIE));
    Redirect::to(uri!(login_form))
}

#[get("/all_notes")]
pub async fn all_notes(db: &State<Pool<Sqlite>>) -> Result<Template, Status> {
    let notes = get_all_notes(db).await?;

    Ok(Template::render(
        "notes",
        context! {
            title: "All Notes - Notekeeper",
            notes: notes,
        },
    ))
}

#[post("/create", data = "<form>")]
pub async fn create(form: Form<NoteForm>, db: &State<Pool<Sqlite>>) -> Result<Redirect, Status> {
    create_note(db, &form.title, &form.content).await?;

    Ok(Redirect::to(uri!(all_notes)))
}

#[get("/update/<note_id>")]
pub async fn update_form(note_id: i64, db: &State<Pool<Sqlite>>) -> Result<Template, Status> {
    let note = get_note(db, note_id).await?;

    Ok(Template::render(
        "update",
        context! {
            title: "Edit Note - Notekeeper",
            note: note,
        },
    ))
}

#[post("/update/<note_id>", data = "<form>")]
pub async fn update(
    note_id: i64,
    form: Form<NoteForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, Status> {
    update_note(db, note_id, &form.title, &form.content).await?;

    Ok(Redirect::to(uri!(all_notes)))
}

#[post("/delete/<note_id>")]
pub async fn delete(note_id: i64, db: &State<Pool<Sqlite>>) -> Result<Redirect, Status> {
    delete_note(db, note_id).await?;

    Ok(Redirect::to(uri!(all_notes)))
}
