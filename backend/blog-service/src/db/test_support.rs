//! A [`MemoryStore`] with switchable faults for tests.
use crate::db::{MemoryStore, PostFilter, Store};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentView, Group, NewGroup, NewPost, Post, PostChanges, PostView, User,
};

#[derive(Default)]
pub struct FaultyStore {
    /// Calls through `inner` bypass the faults.
    pub inner: MemoryStore,
    /// `is_following` always answers false, as a request racing another
    /// follow of the same pair would see it.
    pub stale_follow_check: bool,
    /// `create_post` and `update_post` fail.
    pub fail_post_writes: bool,
}

fn write_failure() -> AppError {
    AppError::Internal(anyhow::anyhow!("post write failed"))
}

#[async_trait::async_trait]
impl Store for FaultyStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        self.inner.create_user(username, password_hash).await
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        self.inner.find_user_by_id(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        self.inner.create_group(group).await
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        self.inner.find_group_by_slug(slug).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.inner.list_groups().await
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        self.inner.delete_group(group_id).await
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        if self.fail_post_writes {
            return Err(write_failure());
        }
        self.inner.create_post(post).await
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>> {
        if self.fail_post_writes {
            return Err(write_failure());
        }
        self.inner.update_post(post_id, changes).await
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        self.inner.delete_post(post_id).await
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        self.inner.find_post(post_id).await
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        self.inner.count_posts(filter).await
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>> {
        self.inner.list_posts(filter, limit, offset).await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment> {
        self.inner.create_comment(post_id, author_id, text).await
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        self.inner.list_comments(post_id).await
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<()> {
        self.inner.create_follow(user_id, author_id).await
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        self.inner.delete_follow(user_id, author_id).await
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        if self.stale_follow_check {
            return Ok(false);
        }
        self.inner.is_following(user_id, author_id).await
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        self.inner.count_followers(author_id).await
    }

    async fn count_following(&self, user_id: i64) -> Result<i64> {
        self.inner.count_following(user_id).await
    }
}
