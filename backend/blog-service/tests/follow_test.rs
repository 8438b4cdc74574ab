#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{location, TestContext};

#[actix_web::test]
async fn follow_is_idempotent_and_unfollow_removes_edge() {
    let ctx = TestContext::new();
    let follower = ctx.user("follower").await;
    let author = ctx.user("author").await;
    let cookie = ctx.cookie(&follower);
    let app = init_app!(ctx);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/author/follow/")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/author/");
    }
    assert_eq!(ctx.store().count_followers(author.id).await.unwrap(), 1);
    assert!(ctx.store().is_following(follower.id, author.id).await.unwrap());

    let req = test::TestRequest::get()
        .uri("/author/unfollow/")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(ctx.store().count_followers(author.id).await.unwrap(), 0);

    let req = test::TestRequest::get()
        .uri("/author/unfollow/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn self_follow_redirects_without_edge() {
    let ctx = TestContext::new();
    let user = ctx.user("Sergey").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/Sergey/follow/")
        .cookie(ctx.cookie(&user))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/Sergey/");
    assert_eq!(ctx.store().count_following(user.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn following_unknown_user_is_404() {
    let ctx = TestContext::new();
    let user = ctx.user("Sergey").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/ghost/follow/")
        .cookie(ctx.cookie(&user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn following_feed_shows_only_followed_authors() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let follower = ctx.user("follower").await;
    let stranger = ctx.user("stranger").await;
    let post = ctx.post(&author, "Пост для подписчиков", None).await;
    ctx.store().create_follow(follower.id, author.id).await.unwrap();
    let app = init_app!(ctx);

    let marker = format!(r#"data-post-id="{}""#, post.id);

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(ctx.cookie(&follower))
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    assert!(String::from_utf8_lossy(&body).contains(&marker));

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(ctx.cookie(&stranger))
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    assert!(!String::from_utf8_lossy(&body).contains(&marker));
}

#[actix_web::test]
async fn profile_shows_follow_state_and_counts() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let follower = ctx.user("follower").await;
    ctx.store().create_follow(follower.id, author.id).await.unwrap();
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/author/")
        .cookie(ctx.cookie(&follower))
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains(r#"href="/author/unfollow/""#));
    assert!(html.contains(r#"<span data-stat="followers_count">1</span>"#));

    let req = test::TestRequest::get()
        .uri("/follower/")
        .cookie(ctx.cookie(&author))
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains(r#"href="/follower/follow/""#));
    assert!(html.contains(r#"<span data-stat="follow_count">1</span>"#));
}
