/// Profile pages and follow edges
use super::{html, redirect};
use crate::error::Result;
use crate::middleware::Actor;
use crate::services::{FollowOutcome, PageQuery};
use crate::state::AppState;
use crate::templates;
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn profile(
    state: web::Data<AppState>,
    actor: Actor,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = state.feed().list_by_author(&username, query.number()).await?;

    let following = match actor.user() {
        Some(user) => state.store.is_following(user.id, feed.author.id).await?,
        None => false,
    };

    Ok(html(templates::posts::profile(actor.user(), &feed, following)))
}

/// GET /follow/
pub async fn follow_index(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let page = state.feed().list_following(user, query.number()).await?;
    Ok(html(templates::posts::follow(Some(user), &page)))
}

pub async fn profile_follow(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let outcome = state.access().follow(user, &username).await?;
    if outcome != FollowOutcome::Created {
        tracing::debug!(user_id = user.id, target = %username, ?outcome, "Follow unchanged");
    }
    Ok(redirect(templates::profile_url(&username)))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    state.access().unfollow(user, &username).await?;
    Ok(redirect(templates::profile_url(&username)))
}
