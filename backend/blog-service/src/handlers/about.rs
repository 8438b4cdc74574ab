use super::html;
use crate::middleware::Actor;
use crate::templates::misc;
use actix_web::HttpResponse;

pub async fn author(actor: Actor) -> HttpResponse {
    html(misc::about_author(actor.user()))
}

pub async fn tech(actor: Actor) -> HttpResponse {
    html(misc::about_tech(actor.user()))
}
