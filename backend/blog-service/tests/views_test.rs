#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use blog_service::models::{NewPost, PostChanges};
use common::TestContext;

fn count_cards(body: &str) -> usize {
    body.matches(r#"<article class="post""#).count()
}

macro_rules! get_body {
    ($app:expr, $uri:expr) => {{
        let uri: &str = $uri;
        let resp = test::call_service(&$app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
        String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
    }};
}

#[actix_web::test]
async fn post_appears_on_index_group_and_profile() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    let group = ctx.group("Заголовок", "test-slug").await;
    let post = ctx.post(&author, "Тестовый текст", Some(&group)).await;
    let app = init_app!(ctx);

    let marker = format!(r#"data-post-id="{}""#, post.id);
    for uri in ["/", "/group/test-slug/", "/Sergey/"] {
        let body = get_body!(app, uri);
        assert!(body.contains(&marker), "{uri} lists the post");
        assert!(body.contains("Тестовый текст"), "{uri} shows the text");
    }

    let profile = get_body!(app, "/Sergey/");
    assert!(profile.contains(r#"<span data-stat="post_count">1</span>"#));
    assert!(profile.contains(r#"<span data-stat="followers_count">0</span>"#));
}

#[actix_web::test]
async fn post_is_not_listed_in_other_group() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    let group = ctx.group("Заголовок", "test-slug").await;
    ctx.group("Другая", "other-slug").await;
    let post = ctx.post(&author, "Тестовый текст", Some(&group)).await;
    let app = init_app!(ctx);

    let body = get_body!(app, "/group/other-slug/");
    assert!(!body.contains(&format!(r#"data-post-id="{}""#, post.id)));
}

#[actix_web::test]
async fn post_page_shows_post_and_author_stats() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    ctx.post(&author, "Первый пост", None).await;
    let post = ctx.post(&author, "Тестовый текст", None).await;
    let app = init_app!(ctx);

    let body = get_body!(app, &format!("/Sergey/{}/", post.id));
    assert!(body.contains("Тестовый текст"));
    assert!(!body.contains("Первый пост"));
    assert!(body.contains(r#"<span data-stat="post_count">2</span>"#));
    // Anonymous readers get no comment form and no edit link
    assert!(!body.contains("comment/\""));
    assert!(!body.contains("edit/\""));
}

#[actix_web::test]
async fn index_paginates_by_ten() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    for i in 0..13 {
        ctx.post(&author, &format!("Пост {i}"), None).await;
    }
    let app = init_app!(ctx);

    assert_eq!(count_cards(&get_body!(app, "/")), 10);
    assert_eq!(count_cards(&get_body!(app, "/?page=2")), 3);
    assert_eq!(count_cards(&get_body!(app, "/?page=abc")), 10);

    let clamped = get_body!(app, "/?page=99");
    assert_eq!(count_cards(&clamped), 3);
    assert!(clamped.contains(r#"data-page="2""#));
}

#[actix_web::test]
async fn profile_paginates_by_five() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    for i in 0..7 {
        ctx.post(&author, &format!("Пост {i}"), None).await;
    }
    let app = init_app!(ctx);

    assert_eq!(count_cards(&get_body!(app, "/Sergey/")), 5);
    assert_eq!(count_cards(&get_body!(app, "/Sergey/?page=2")), 2);
}

#[actix_web::test]
async fn image_is_rendered_everywhere() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    let group = ctx.group("Заголовок", "test-slug").await;
    let post = ctx
        .store()
        .create_post(NewPost {
            author_id: author.id,
            text: "С картинкой".into(),
            group_id: Some(group.id),
            image: Some("posts/small.gif".into()),
        })
        .await
        .unwrap();
    let app = init_app!(ctx);

    let img = r#"src="/media/posts/small.gif""#;
    let post_page = format!("/Sergey/{}/", post.id);
    for uri in ["/", "/group/test-slug/", "/Sergey/", post_page.as_str()] {
        assert!(get_body!(app, uri).contains(img), "{uri} shows the image");
    }
}

#[actix_web::test]
async fn deleted_group_keeps_post_on_index() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    let group = ctx.group("Заголовок", "test-slug").await;
    let post = ctx.post(&author, "Тестовый текст", Some(&group)).await;
    ctx.store().delete_group(group.id).await.unwrap();
    let app = init_app!(ctx);

    let body = get_body!(app, "/");
    assert!(body.contains(&format!(r#"data-post-id="{}""#, post.id)));
    assert!(!body.contains("/group/test-slug/"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/group/test-slug/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn edited_text_is_shown() {
    let ctx = TestContext::new();
    let author = ctx.user("Sergey").await;
    let post = ctx.post(&author, "Старый текст", None).await;
    ctx.store()
        .update_post(
            post.id,
            PostChanges {
                text: "Новый текст".into(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();
    let app = init_app!(ctx);

    let body = get_body!(app, &format!("/Sergey/{}/", post.id));
    assert!(body.contains("Новый текст"));
    assert!(!body.contains("Старый текст"));
}
