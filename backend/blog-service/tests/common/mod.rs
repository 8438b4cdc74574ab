#![allow(dead_code)]

use actix_web::{cookie::Cookie, web};
use blog_service::db::{MemoryStore, Store};
use blog_service::models::{Group, NewGroup, NewPost, Post, User};
use blog_service::services::session::hash_password;
use blog_service::{AppState, Config};
use std::sync::Arc;

pub const PASSWORD: &str = "s3cret-password";
pub const BOUNDARY: &str = "----blogtestboundary";

/// Build the full app over `$ctx.state`, wrapped like the real server.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .wrap(blog_service::handlers::errors::error_handlers())
                .configure(blog_service::routes::configure),
        )
        .await
    };
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub media: tempfile::TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let media = tempfile::tempdir().expect("media dir");
        let config = Config::for_memory_store(media.path().to_string_lossy().into_owned());
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        Self {
            state: web::Data::new(AppState::new(store, config)),
            media,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.state.store
    }

    /// A user whose password is [`PASSWORD`].
    pub async fn user(&self, username: &str) -> User {
        let hash = hash_password(PASSWORD).expect("hash");
        self.store()
            .create_user(username, &hash)
            .await
            .expect("create user")
    }

    pub fn cookie(&self, user: &User) -> Cookie<'static> {
        let token = self.state.sessions.issue(user).expect("token");
        self.state.sessions.login_cookie(token)
    }

    pub async fn group(&self, title: &str, slug: &str) -> Group {
        self.store()
            .create_group(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: "Тестовое описание".to_string(),
            })
            .await
            .expect("create group")
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store()
            .create_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .expect("create post")
    }
}

/// A `multipart/form-data` body with text fields and an optional file.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// A `multipart/form-data` body with one text part carrying raw bytes.
pub fn multipart_raw_field(name: &str, value: &[u8]) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(value);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// A valid 2x2 PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 128, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png)
        .expect("encode png");
    out.into_inner()
}

pub fn location(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn template_marker(name: &str) -> String {
    format!(r#"data-template="{name}""#)
}
