use super::{
    escape, form_fields, linebreaks, page, post_list, post_url, profile_url, Template,
};
use crate::forms::BoundForm;
use crate::models::{CommentView, Group, PostView, User};
use crate::services::{AuthorFeed, MediaStorage, Page};

pub fn index(actor: Option<&User>, posts: &Page<PostView>) -> String {
    let body = format!(
        "<h1>Latest posts</h1>\n{}",
        post_list(posts, true)
    );
    page(Template::Index, "Latest posts", actor, &body)
}

pub fn group(actor: Option<&User>, group: &Group, posts: &Page<PostView>) -> String {
    let body = format!(
        r#"<h1 data-group="{slug}">{title}</h1>
<p class="description">{description}</p>
{posts}"#,
        slug = escape(&group.slug),
        title = escape(&group.title),
        description = linebreaks(&group.description),
        posts = post_list(posts, false)
    );
    page(Template::Group, &group.title, actor, &body)
}

pub fn follow(actor: Option<&User>, posts: &Page<PostView>) -> String {
    let body = format!(
        "<h1>Posts by authors you follow</h1>\n{}",
        post_list(posts, true)
    );
    page(Template::Follow, "Following", actor, &body)
}

/// The create form, or the edit form when `editing` names the post.
pub fn post_form(actor: Option<&User>, form: &BoundForm, editing: Option<&PostView>) -> String {
    let (heading, action, button) = match editing {
        Some(post) => (
            "Edit post",
            format!("{}edit/", post_url(&post.author_username, post.id)),
            "Save",
        ),
        None => ("New post", "/new/".to_string(), "Publish"),
    };

    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}" enctype="multipart/form-data" data-editing="{editing}">
{fields}
<button type="submit">{button}</button>
</form>"#,
        action = escape(&action),
        editing = editing.is_some(),
        fields = form_fields(form),
    );
    page(Template::PostNew, heading, actor, &body)
}

fn author_card(feed_author: &User, post_count: i64, followers: i64, following: i64) -> String {
    format!(
        r#"<section class="author">
<h2><a href="{url}">{username}</a></h2>
<p>Posts: <span data-stat="post_count">{post_count}</span></p>
<p>Followers: <span data-stat="followers_count">{followers}</span></p>
<p>Following: <span data-stat="follow_count">{following}</span></p>
</section>"#,
        url = profile_url(&feed_author.username),
        username = escape(&feed_author.username),
    )
}

/// `following` reports whether the actor follows the profile's author.
pub fn profile(actor: Option<&User>, feed: &AuthorFeed, following: bool) -> String {
    let author = &feed.author;
    let mut body = author_card(
        author,
        feed.post_count,
        feed.followers_count,
        feed.following_count,
    );

    let is_self = actor.is_some_and(|u| u.id == author.id);
    if actor.is_some() && !is_self {
        let (verb, label) = if following {
            ("unfollow", "Unfollow")
        } else {
            ("follow", "Follow")
        };
        body.push_str(&format!(
            r#"<p><a class="button" href="{}{verb}/" data-following="{following}">{label}</a></p>"#,
            profile_url(&author.username)
        ));
    }

    body.push_str(&post_list(&feed.page, true));
    page(Template::Profile, &author.username, actor, &body)
}

pub struct PostPage<'a> {
    pub post: &'a PostView,
    pub author: &'a User,
    pub post_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub comments: &'a [CommentView],
    pub comment_form: &'a BoundForm,
    pub can_edit: bool,
}

pub fn post(actor: Option<&User>, ctx: &PostPage<'_>) -> String {
    let post = ctx.post;
    let mut body = author_card(
        ctx.author,
        ctx.post_count,
        ctx.followers_count,
        ctx.following_count,
    );

    body.push_str(&format!(
        r#"<article class="post" data-post-id="{id}"><p class="meta">{date}</p>"#,
        id = post.id,
        date = post.pub_date.format("%d %b %Y %H:%M"),
    ));
    if let Some(image) = &post.image {
        body.push_str(&format!(
            r#"<img class="post-image" src="{}" alt="">"#,
            escape(&MediaStorage::url(image))
        ));
    }
    body.push_str(&format!(r#"<p class="text">{}</p>"#, linebreaks(&post.text)));
    if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
        body.push_str(&format!(
            r#"<p>Group: <a href="/group/{}/">{}</a></p>"#,
            urlencoding::encode(slug),
            escape(title)
        ));
    }
    if ctx.can_edit {
        body.push_str(&format!(
            r#"<p><a class="button" href="{}edit/">Edit</a></p>"#,
            post_url(&post.author_username, post.id)
        ));
    }
    body.push_str("</article>");

    body.push_str(r#"<section class="comments">"#);
    if actor.is_some() {
        body.push_str(&format!(
            r#"<form method="post" action="{}comment/">{}<button type="submit">Send</button></form>"#,
            post_url(&post.author_username, post.id),
            form_fields(ctx.comment_form)
        ));
    }
    for comment in ctx.comments {
        body.push_str(&format!(
            r#"<div class="comment" data-comment-id="{id}"><p><a href="{url}">{author}</a> · {date}</p><p>{text}</p></div>"#,
            id = comment.id,
            url = profile_url(&comment.author_username),
            author = escape(&comment.author_username),
            date = comment.created.format("%d %b %Y %H:%M"),
            text = linebreaks(&comment.text),
        ));
    }
    body.push_str("</section>");

    let title = post.to_string();
    page(Template::Post, &title, actor, &body)
}
