/// In-process [`Store`] used by tests and `store = "memory"` runs.
///
/// All tables live behind one `RwLock`, so every write (including the
/// follow-pair uniqueness check) is atomic with respect to other requests.
use crate::db::{PostFilter, Store};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentView, Follow, Group, NewGroup, NewPost, Post, PostChanges, PostView, User,
};
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn view(&self, post: &Post) -> PostView {
        let author_username = self
            .users
            .iter()
            .find(|u| u.id == post.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id));
        let comment_count = self
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as i64;

        PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            image: post.image.clone(),
            author_id: post.author_id,
            author_username,
            group_id: post.group_id,
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
            comment_count,
        }
    }

    fn require_user(&self, user_id: i64) -> Result<()> {
        if self.users.iter().any(|u| u.id == user_id) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "foreign key violated: user {user_id} does not exist"
            )))
        }
    }

    fn require_group(&self, group_id: Option<i64>) -> Result<()> {
        match group_id {
            Some(id) if !self.groups.iter().any(|g| g.id == id) => Err(AppError::Conflict(
                format!("foreign key violated: group {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "username {username} is already taken"
            )));
        }
        let user = User {
            id: t.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            date_joined: Utc::now(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let mut t = self.tables.write().await;
        if t.groups.iter().any(|g| g.slug == group.slug) {
            return Err(AppError::Conflict(format!(
                "group slug {} is already taken",
                group.slug
            )));
        }
        let group = Group {
            id: t.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        t.groups.push(group.clone());
        Ok(group)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let t = self.tables.read().await;
        let mut groups = t.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.groups.len();
        t.groups.retain(|g| g.id != group_id);
        if t.groups.len() == before {
            return Ok(false);
        }
        for post in t.posts.iter_mut().filter(|p| p.group_id == Some(group_id)) {
            post.group_id = None;
        }
        Ok(true)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let mut t = self.tables.write().await;
        t.require_user(post.author_id)?;
        t.require_group(post.group_id)?;
        let post = Post {
            id: t.next_id(),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let mut t = self.tables.write().await;
        t.require_group(changes.group_id)?;
        let Some(post) = t.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        post.text = changes.text;
        post.group_id = changes.group_id;
        post.image = changes.image;
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.posts.len();
        t.posts.retain(|p| p.id != post_id);
        if t.posts.len() == before {
            return Ok(false);
        }
        t.comments.retain(|c| c.post_id != post_id);
        Ok(true)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().find(|p| p.id == post_id).map(|p| t.view(p)))
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().filter(|p| t.matches(p, filter)).count() as i64)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>> {
        let t = self.tables.read().await;
        let mut posts: Vec<&Post> = t.posts.iter().filter(|p| t.matches(p, filter)).collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|p| t.view(p))
            .collect())
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut t = self.tables.write().await;
        t.require_user(author_id)?;
        if !t.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::Conflict(format!(
                "foreign key violated: post {post_id} does not exist"
            )));
        }
        let comment = Comment {
            id: t.next_id(),
            post_id,
            author_id,
            text: text.to_string(),
            created: Utc::now(),
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let t = self.tables.read().await;
        let mut comments: Vec<CommentView> = t
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentView {
                id: c.id,
                post_id: c.post_id,
                author_id: c.author_id,
                author_username: t
                    .users
                    .iter()
                    .find(|u| u.id == c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                text: c.text.clone(),
                created: c.created,
            })
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<()> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        t.require_user(author_id)?;
        if t
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Err(AppError::Conflict(
                "unique constraint unique_follow violated".to_string(),
            ));
        }
        let follow = Follow {
            id: t.next_id(),
            user_id,
            author_id,
        };
        t.follows.push(follow);
        Ok(())
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.follows.len();
        t.follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(t.follows.len() < before)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let t = self.tables.read().await;
        Ok(t
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.follows.iter().filter(|f| f.author_id == author_id).count() as i64)
    }

    async fn count_following(&self, user_id: i64) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.follows.iter().filter(|f| f.user_id == user_id).count() as i64)
    }
}
