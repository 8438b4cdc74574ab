/// Login, signup and logout
use super::{html, safe_next};
use crate::error::{AppError, Result};
use crate::forms::{FormErrors, FormInput, LoginForm, SignupForm};
use crate::models::User;
use crate::services::session::{hash_password, verify_password};
use crate::state::AppState;
use crate::templates;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::Deserialize;

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Redirect to `next` with a fresh session cookie.
fn start_session(state: &AppState, user: &User, next: &str) -> Result<HttpResponse> {
    let token = state.sessions.issue(user)?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, next))
        .cookie(state.sessions.login_cookie(token))
        .finish())
}

pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    html(templates::auth::login(
        &LoginForm::blank(),
        safe_next(query.next.as_deref()),
    ))
}

pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let input = FormInput::read(&req, payload, state.media.max_upload_bytes()).await?;
    let next = safe_next(input.text("next")).map(str::to_string);
    let form = LoginForm::from_input(&input);

    if let Err(bound) = form.check() {
        return Ok(html(templates::auth::login(&bound, next.as_deref())));
    }

    let user = state
        .store
        .find_user_by_username(&form.username)
        .await?
        .filter(|u| verify_password(&form.password, &u.password_hash));

    let Some(user) = user else {
        tracing::info!(username = %form.username, "Failed login attempt");
        let mut errors = FormErrors::default();
        errors.add_non_field(BAD_CREDENTIALS);
        return Ok(html(templates::auth::login(
            &form.bound(errors),
            next.as_deref(),
        )));
    };

    tracing::info!(user_id = user.id, "User logged in");
    start_session(&state, &user, next.as_deref().unwrap_or("/"))
}

pub async fn signup_form() -> HttpResponse {
    html(templates::auth::signup(&SignupForm::blank()))
}

pub async fn signup(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let input = FormInput::read(&req, payload, state.media.max_upload_bytes()).await?;
    let form = SignupForm::from_input(&input);

    if let Err(bound) = form.check() {
        return Ok(html(templates::auth::signup(&bound)));
    }

    let taken = || -> Result<HttpResponse> {
        let mut errors = FormErrors::default();
        errors.add("username", USERNAME_TAKEN);
        Ok(html(templates::auth::signup(&form.bound(errors))))
    };

    if state
        .store
        .find_user_by_username(&form.username)
        .await?
        .is_some()
    {
        return taken();
    }

    let password_hash = hash_password(&form.password)?;
    let user = match state.store.create_user(&form.username, &password_hash).await {
        Ok(user) => user,
        Err(AppError::Conflict(_)) => return taken(),
        Err(e) => return Err(e),
    };

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    start_session(&state, &user, "/")
}

pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(super::HTML_CONTENT_TYPE)
        .cookie(state.sessions.logout_cookie())
        .body(templates::auth::logged_out())
}
