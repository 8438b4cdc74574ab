/// Post handlers: feeds, post pages, create, edit and comment
use super::{html, redirect};
use crate::db::PostFilter;
use crate::error::{AppError, Result};
use crate::forms::{CommentForm, FormInput, ImageChange, PostForm};
use crate::middleware::Actor;
use crate::models::{NewPost, PostChanges, PostView};
use crate::services::{AccessControl, PageQuery};
use crate::state::AppState;
use crate::templates::{self, posts::PostPage};
use actix_web::{http::header, web, HttpRequest, HttpResponse};

/// Home feed
pub async fn index(
    state: web::Data<AppState>,
    actor: Actor,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = state.feed().list_all(query.number()).await?;

    Ok(HttpResponse::Ok()
        .content_type(super::HTML_CONTENT_TYPE)
        .insert_header((
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.config.cache.index_max_age_secs),
        ))
        .insert_header((header::VARY, "Cookie"))
        .body(templates::posts::index(actor.user(), &page)))
}

pub async fn group_posts(
    state: web::Data<AppState>,
    actor: Actor,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (group, page) = state.feed().list_by_group(&slug, query.number()).await?;
    Ok(html(templates::posts::group(actor.user(), &group, &page)))
}

/// GET /new/
pub async fn new_post_form(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let groups = state.store.list_groups().await?;
    Ok(html(templates::posts::post_form(
        Some(user),
        &PostForm::blank(&groups),
        None,
    )))
}

/// POST /new/
pub async fn create_post(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let groups = state.store.list_groups().await?;
    let input = FormInput::read(&req, payload, state.media.max_upload_bytes()).await?;

    let clean = match PostForm::validate(&input, &groups, state.media.max_upload_bytes()) {
        Ok(clean) => clean,
        Err(form) => {
            return Ok(html(templates::posts::post_form(Some(user), &form, None)));
        }
    };

    let image = match clean.image {
        ImageChange::Replace(upload) => Some(
            state
                .media
                .save_post_image(&upload.filename, &upload.bytes)
                .await?,
        ),
        ImageChange::Keep | ImageChange::Clear => None,
    };

    let created = state
        .store
        .create_post(NewPost {
            author_id: user.id,
            text: clean.text,
            group_id: clean.group_id,
            image: image.clone(),
        })
        .await;
    let post = match created {
        Ok(post) => post,
        Err(e) => {
            discard_upload(&state, image.as_deref()).await;
            return Err(e);
        }
    };

    tracing::info!(post_id = post.id, user_id = user.id, "Post created");
    Ok(redirect("/"))
}

async fn discard_upload(state: &AppState, stored: Option<&str>) {
    if let Some(stored) = stored {
        state.media.remove(stored).await;
    }
}

/// The post at `/{username}/{post_id}/`, or NotFound when the id exists but
/// belongs to someone else.
async fn find_post_of(state: &AppState, username: &str, post_id: i64) -> Result<PostView> {
    state
        .store
        .find_post(post_id)
        .await?
        .filter(|p| p.author_username == username)
        .ok_or_else(|| AppError::not_found(format!("post {post_id} by {username}")))
}

pub async fn post_view(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let post = find_post_of(&state, &username, post_id).await?;

    let author = state
        .store
        .find_user_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {username}")))?;
    let post_count = state.store.count_posts(PostFilter::Author(author.id)).await?;
    let followers_count = state.store.count_followers(author.id).await?;
    let following_count = state.store.count_following(author.id).await?;
    let comments = state.store.list_comments(post.id).await?;

    let ctx = PostPage {
        post: &post,
        author: &author,
        post_count,
        followers_count,
        following_count,
        comments: &comments,
        comment_form: &CommentForm::blank(),
        can_edit: AccessControl::can_edit_post(&actor, &post),
    };
    Ok(html(templates::posts::post(actor.user(), &ctx)))
}

/// GET /{username}/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let (username, post_id) = path.into_inner();
    let post = find_post_of(&state, &username, post_id).await?;

    if !AccessControl::can_edit_post(&actor, &post) {
        tracing::debug!(post_id, user_id = user.id, "Edit by non-author redirected");
        return Ok(redirect(templates::post_url(&username, post_id)));
    }

    let groups = state.store.list_groups().await?;
    Ok(html(templates::posts::post_form(
        Some(user),
        &PostForm::for_post(&groups, &post),
        Some(&post),
    )))
}

/// POST /{username}/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    path: web::Path<(String, i64)>,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let (username, post_id) = path.into_inner();
    let post = find_post_of(&state, &username, post_id).await?;
    let post_page = templates::post_url(&username, post_id);

    if !AccessControl::can_edit_post(&actor, &post) {
        tracing::debug!(post_id, user_id = user.id, "Edit by non-author redirected");
        return Ok(redirect(post_page));
    }

    let groups = state.store.list_groups().await?;
    let input = FormInput::read(&req, payload, state.media.max_upload_bytes()).await?;

    let clean = match PostForm::validate(&input, &groups, state.media.max_upload_bytes()) {
        Ok(clean) => clean,
        Err(form) => {
            let form = form.with_value("image", post.image.clone().unwrap_or_default());
            return Ok(html(templates::posts::post_form(
                Some(user),
                &form,
                Some(&post),
            )));
        }
    };

    // Only a file written by this request is removed if the update fails.
    let (image, saved) = match clean.image {
        ImageChange::Keep => (post.image.clone(), None),
        ImageChange::Clear => (None, None),
        ImageChange::Replace(upload) => {
            let stored = state
                .media
                .save_post_image(&upload.filename, &upload.bytes)
                .await?;
            (Some(stored.clone()), Some(stored))
        }
    };

    let updated = state
        .store
        .update_post(
            post.id,
            PostChanges {
                text: clean.text,
                group_id: clean.group_id,
                image,
            },
        )
        .await
        .and_then(|p| p.ok_or_else(|| AppError::not_found(format!("post {post_id}"))));
    if let Err(e) = updated {
        discard_upload(&state, saved.as_deref()).await;
        return Err(e);
    }

    tracing::info!(post_id, user_id = user.id, "Post updated");
    Ok(redirect(post_page))
}

/// POST /{username}/{post_id}/comment/
///
/// An invalid comment is dropped; either way the actor lands back on the post.
pub async fn add_comment(
    state: web::Data<AppState>,
    actor: Actor,
    req: HttpRequest,
    path: web::Path<(String, i64)>,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let user = actor.require(req.path())?;
    let (username, post_id) = path.into_inner();
    let post = find_post_of(&state, &username, post_id).await?;

    let input = FormInput::read(&req, payload, state.media.max_upload_bytes()).await?;
    match CommentForm::validate(&input) {
        Ok(text) => {
            let comment = state.store.create_comment(post.id, user.id, &text).await?;
            tracing::info!(comment_id = comment.id, post_id, user_id = user.id, "Comment added");
        }
        Err(errors) => {
            tracing::debug!(post_id, user_id = user.id, ?errors, "Invalid comment ignored");
        }
    }

    Ok(redirect(templates::post_url(&username, post_id)))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::db::test_support::FaultyStore;
    use crate::db::Store;
    use crate::forms::test_support::png_bytes;
    use crate::models::NewPost;
    use crate::state::AppState;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use std::sync::Arc;

    const BOUNDARY: &str = "postimageboundary";

    fn image_body(text: &str) -> (String, Vec<u8>) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"small.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&png_bytes());
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }

    fn stored_images(media: &tempfile::TempDir) -> usize {
        std::fs::read_dir(media.path().join("posts"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[actix_web::test]
    async fn failed_post_writes_leave_no_image_behind() {
        let media = tempfile::tempdir().unwrap();
        let faulty = FaultyStore {
            fail_post_writes: true,
            ..FaultyStore::default()
        };
        let user = faulty.inner.create_user("Sergey", "x").await.unwrap();
        let post = faulty
            .inner
            .create_post(NewPost {
                author_id: user.id,
                text: "Текст".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        let store: Arc<dyn Store> = Arc::new(faulty);

        let state = AppState::new(
            store.clone(),
            Config::for_memory_store(media.path().to_string_lossy().into_owned()),
        );
        let cookie = state
            .sessions
            .login_cookie(state.sessions.issue(&user).unwrap());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure),
        )
        .await;

        for uri in ["/new/".to_string(), format!("/Sergey/{}/edit/", post.id)] {
            let (content_type, body) = image_body("Новый текст");
            let req = test::TestRequest::post()
                .uri(&uri)
                .cookie(cookie.clone())
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(stored_images(&media), 0, "{uri}");
        }

        let stored = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.text, "Текст");
        assert_eq!(stored.image, None);
    }
}
