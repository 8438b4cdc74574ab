/// Database access layer
///
/// [`Store`] is the persistence seam of the service. [`PgStore`] backs it
/// with PostgreSQL through sqlx; [`MemoryStore`] keeps the same tables in
/// process for tests and local runs.
///
/// Uniqueness (usernames, group slugs, follow pairs) is enforced by the
/// store and reported as [`AppError::Conflict`](crate::error::AppError).
pub mod memory_store;
pub mod pg_store;
#[cfg(test)]
pub(crate) mod test_support;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;

use crate::error::Result;
use crate::models::{
    Comment, CommentView, Group, NewGroup, NewPost, Post, PostChanges, PostView, User,
};

/// Which posts a feed query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by any author the given user follows
    FollowedBy(i64),
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    // Groups

    async fn create_group(&self, group: NewGroup) -> Result<Group>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    /// All groups ordered by title, for the post form's choices.
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Delete a group; its posts stay with their group cleared.
    async fn delete_group(&self, group_id: i64) -> Result<bool>;

    // Posts

    async fn create_post(&self, post: NewPost) -> Result<Post>;

    /// Returns `None` when the post does not exist.
    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>>;

    /// Delete a post and its comments.
    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>>;

    async fn count_posts(&self, filter: PostFilter) -> Result<i64>;

    /// Posts newest first (`pub_date`, then `id`, descending).
    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64)
        -> Result<Vec<PostView>>;

    // Comments

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;

    // Follows

    /// Insert a follow edge. A duplicate pair is a `Conflict`.
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<()>;

    /// Remove a follow edge; returns whether one existed.
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// How many users follow `author_id`.
    async fn count_followers(&self, author_id: i64) -> Result<i64>;

    /// How many authors `user_id` follows.
    async fn count_following(&self, user_id: i64) -> Result<i64>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
