/// Server-side HTML rendering
///
/// Every page is a function from a typed context to a `String`. The full
/// document comes from [`page`], which wraps a body in the site layout and
/// marks `<main>` with the template's name (`data-template="index.html"`).
pub mod auth;
pub mod misc;
pub mod posts;

use crate::forms::{BoundForm, FieldKind};
use crate::models::{PostView, User};
use crate::services::{MediaStorage, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Group,
    PostNew,
    Profile,
    Post,
    Follow,
    AboutAuthor,
    AboutTech,
    NotFound,
    ServerError,
    Login,
    Signup,
    LoggedOut,
}

impl Template {
    pub fn name(self) -> &'static str {
        match self {
            Template::Index => "index.html",
            Template::Group => "group.html",
            Template::PostNew => "posts/new.html",
            Template::Profile => "posts/profile.html",
            Template::Post => "posts/post.html",
            Template::Follow => "follow.html",
            Template::AboutAuthor => "about/author.html",
            Template::AboutTech => "about/tech.html",
            Template::NotFound => "misc/404.html",
            Template::ServerError => "misc/500.html",
            Template::Login => "registration/login.html",
            Template::Signup => "registration/signup.html",
            Template::LoggedOut => "registration/logged_out.html",
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape and keep line breaks.
pub fn linebreaks(s: &str) -> String {
    escape(s).replace("\r\n", "\n").replace('\n', "<br>")
}

pub fn profile_url(username: &str) -> String {
    format!("/{}/", urlencoding::encode(username))
}

pub fn post_url(username: &str, post_id: i64) -> String {
    format!("/{}/{}/", urlencoding::encode(username), post_id)
}

/// Wrap `body` in the site layout.
pub fn page(template: Template, title: &str, actor: Option<&User>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
{nav}
<main data-template="{template}">
{body}
</main>
<footer><p>&copy; Yatube</p></footer>
</body>
</html>
"#,
        title = escape(title),
        nav = nav(actor),
        template = template.name(),
        body = body,
    )
}

fn nav(actor: Option<&User>) -> String {
    let mut links = vec![
        r#"<a href="/">Home</a>"#.to_string(),
        r#"<a href="/about/author/">About the author</a>"#.to_string(),
        r#"<a href="/about/tech/">Technologies</a>"#.to_string(),
    ];
    match actor {
        Some(user) => {
            links.push(r#"<a href="/follow/">Following</a>"#.to_string());
            links.push(r#"<a href="/new/">New post</a>"#.to_string());
            links.push(format!(
                r#"<a href="{}" data-user="{}">{}</a>"#,
                profile_url(&user.username),
                escape(&user.username),
                escape(&user.username)
            ));
            links.push(r#"<a href="/auth/logout/">Log out</a>"#.to_string());
        }
        None => {
            links.push(r#"<a href="/auth/login/">Log in</a>"#.to_string());
            links.push(r#"<a href="/auth/signup/">Sign up</a>"#.to_string());
        }
    }
    format!("<nav>{}</nav>", links.join(" "))
}

/// Previous/next links for a page; nothing when there is only one page.
pub fn paginator<T>(page: &Page<T>) -> String {
    if !page.has_other_pages() {
        return String::new();
    }

    let mut out = String::from(r#"<nav class="pagination">"#);
    if let Some(prev) = page.previous_page_number() {
        out.push_str(r#"<a href="?page=1">First</a> "#);
        out.push_str(&format!(r#"<a href="?page={prev}" rel="prev">Previous</a> "#));
    }
    out.push_str(&format!(
        r#"<span class="current" data-page="{n}">Page {n} of {total}</span>"#,
        n = page.number,
        total = page.num_pages
    ));
    if let Some(next) = page.next_page_number() {
        out.push_str(&format!(r#" <a href="?page={next}" rel="next">Next</a>"#));
        out.push_str(&format!(r#" <a href="?page={}">Last</a>"#, page.num_pages));
    }
    out.push_str("</nav>");
    out
}

/// One post as shown in a feed.
pub fn post_card(post: &PostView, link_group: bool) -> String {
    let mut out = format!(r#"<article class="post" data-post-id="{}">"#, post.id);
    out.push_str(&format!(
        r#"<p class="meta">Author: <a href="{}">{}</a> · {}</p>"#,
        profile_url(&post.author_username),
        escape(&post.author_username),
        post.pub_date.format("%d %b %Y")
    ));
    if let Some(image) = &post.image {
        out.push_str(&format!(
            r#"<img class="post-image" src="{}" alt="">"#,
            escape(&MediaStorage::url(image))
        ));
    }
    out.push_str(&format!(r#"<p class="text">{}</p>"#, linebreaks(&post.text)));
    out.push_str(&format!(
        r#"<p class="links"><a href="{}">Details</a> · {} comments"#,
        post_url(&post.author_username, post.id),
        post.comment_count
    ));
    if link_group {
        if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
            out.push_str(&format!(
                r#" · <a href="/group/{}/">{}</a>"#,
                urlencoding::encode(slug),
                escape(title)
            ));
        }
    }
    out.push_str("</p></article>");
    out
}

pub fn post_list(page: &Page<PostView>, link_group: bool) -> String {
    let mut out = String::new();
    if page.is_empty() {
        out.push_str(r#"<p class="empty">No posts yet.</p>"#);
    }
    for post in &page.items {
        out.push_str(&post_card(post, link_group));
    }
    out.push_str(&paginator(page));
    out
}

/// Render a bound form's inputs with labels, help texts and errors.
pub fn form_fields(form: &BoundForm) -> String {
    let mut out = String::new();
    for message in form.errors.non_field() {
        out.push_str(&format!(r#"<p class="error">{}</p>"#, escape(message)));
    }

    for field in &form.fields {
        let value = form.value(field.name);
        out.push_str(&format!(
            r#"<div class="field"><label for="id_{name}">{label}</label>"#,
            name = field.name,
            label = escape(field.label)
        ));

        match &field.kind {
            FieldKind::Text { required, multiline } => {
                let required = if *required { " required" } else { "" };
                if *multiline {
                    out.push_str(&format!(
                        r#"<textarea name="{name}" id="id_{name}"{required}>{value}</textarea>"#,
                        name = field.name,
                        value = escape(value)
                    ));
                } else {
                    out.push_str(&format!(
                        r#"<input type="text" name="{name}" id="id_{name}" value="{value}"{required}>"#,
                        name = field.name,
                        value = escape(value)
                    ));
                }
            }
            FieldKind::Choice { choices } => {
                out.push_str(&format!(
                    r#"<select name="{name}" id="id_{name}">"#,
                    name = field.name
                ));
                for (option, label) in choices {
                    let selected = if option == value { " selected" } else { "" };
                    out.push_str(&format!(
                        r#"<option value="{}"{selected}>{}</option>"#,
                        escape(option),
                        escape(label)
                    ));
                }
                out.push_str("</select>");
            }
            FieldKind::Image => {
                if !value.is_empty() {
                    out.push_str(&format!(
                        r#"<p class="current-image">Currently: <a href="{url}">{path}</a> <label><input type="checkbox" name="{name}-clear" id="{name}-clear_id"> Clear</label></p>"#,
                        url = escape(&MediaStorage::url(value)),
                        path = escape(value),
                        name = field.name
                    ));
                }
                out.push_str(&format!(
                    r#"<input type="file" name="{name}" id="id_{name}" accept="image/*">"#,
                    name = field.name
                ));
            }
            FieldKind::Password => {
                out.push_str(&format!(
                    r#"<input type="password" name="{name}" id="id_{name}" required>"#,
                    name = field.name
                ));
            }
        }

        if !field.help_text.is_empty() {
            out.push_str(&format!(
                r#"<small class="help">{}</small>"#,
                escape(field.help_text)
            ));
        }
        for message in form.errors.get(field.name) {
            out.push_str(&format!(
                r#"<p class="error" data-field="{}">{}</p>"#,
                field.name,
                escape(message)
            ));
        }
        out.push_str("</div>");
    }
    out
}
