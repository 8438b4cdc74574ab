use super::{escape, page, Template};
use crate::models::User;

pub fn not_found(actor: Option<&User>, path: &str) -> String {
    let body = format!(
        r#"<h1>Error 404</h1>
<p>Page <code data-path="{path}">{path}</code> was not found.</p>
<p><a href="/">Back to the home page</a></p>"#,
        path = escape(path)
    );
    page(Template::NotFound, "Page not found", actor, &body)
}

pub fn server_error() -> String {
    let body = r#"<h1>Error 500</h1>
<p>Something went wrong on our side. Please try again later.</p>"#;
    page(Template::ServerError, "Server error", None, body)
}

pub fn about_author(actor: Option<&User>) -> String {
    let body = r#"<h1>About the author</h1>
<p>This blog is written and maintained by a small team who like to share short notes,
photos and ideas with friends. Follow the authors you like to see their posts on your
personal feed.</p>"#;
    page(Template::AboutAuthor, "About the author", actor, body)
}

pub fn about_tech(actor: Option<&User>) -> String {
    let body = r#"<h1>Technologies</h1>
<ul>
<li>Rust and actix-web for the HTTP server</li>
<li>PostgreSQL through sqlx for storage</li>
<li>Server-rendered HTML with no client-side framework</li>
</ul>"#;
    page(Template::AboutTech, "Technologies", actor, body)
}
