use crate::handlers::{about, auth, errors, health, posts, profile};
use actix_web::web;

/// Register every route. Fixed paths come before `/{username}/` so that
/// `new`, `follow`, `group`, `about` and `auth` never resolve as usernames.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .service(
            web::resource("/new/")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::create_post)),
        )
        .route("/follow/", web::get().to(profile::follow_index))
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .route("/logout/", web::get().to(auth::logout)),
        )
        .route("/healthz", web::get().to(health::healthz))
        .route("/{username}/", web::get().to(profile::profile))
        .route("/{username}/follow/", web::get().to(profile::profile_follow))
        .route(
            "/{username}/unfollow/",
            web::get().to(profile::profile_unfollow),
        )
        .route(
            r"/{username}/{post_id:\d+}/",
            web::get().to(posts::post_view),
        )
        .service(
            web::resource(r"/{username}/{post_id:\d+}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route(
            r"/{username}/{post_id:\d+}/comment/",
            web::post().to(posts::add_comment),
        )
        .default_service(web::route().to(errors::not_found));
}
