use crate::db::{PostFilter, Store};
use crate::error::{AppError, Result};
use crate::models::{Group, PostView, User};
use crate::services::pagination::{Page, Paginator};
use std::sync::Arc;

/// Posts per page on the home and group feeds.
pub const INDEX_PAGE_SIZE: i64 = 10;
/// Posts per page on profile and following feeds.
pub const PROFILE_PAGE_SIZE: i64 = 5;

/// A profile page's posts together with the author's counters.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub author: User,
    pub page: Page<PostView>,
    pub post_count: i64,
    pub followers_count: i64,
    /// How many authors `author` follows
    pub following_count: i64,
}

/// Computes the post listings shown on feed pages.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn Store>,
}

impl FeedService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        per_page: i64,
        requested: i64,
    ) -> Result<Page<PostView>> {
        let total = self.store.count_posts(filter).await?;
        let paginator = Paginator::new(total, per_page);
        let number = paginator.clamp(requested);
        let posts = self
            .store
            .list_posts(filter, paginator.limit(), paginator.offset(number))
            .await?;

        Ok(paginator.page(number, posts))
    }

    pub async fn list_all(&self, page: i64) -> Result<Page<PostView>> {
        self.paginate(PostFilter::All, INDEX_PAGE_SIZE, page).await
    }

    pub async fn list_by_group(&self, slug: &str, page: i64) -> Result<(Group, Page<PostView>)> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group {slug}")))?;

        let posts = self
            .paginate(PostFilter::Group(group.id), INDEX_PAGE_SIZE, page)
            .await?;

        Ok((group, posts))
    }

    pub async fn list_by_author(&self, username: &str, page: i64) -> Result<AuthorFeed> {
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {username}")))?;

        let page = self
            .paginate(PostFilter::Author(author.id), PROFILE_PAGE_SIZE, page)
            .await?;
        let followers_count = self.store.count_followers(author.id).await?;
        let following_count = self.store.count_following(author.id).await?;

        Ok(AuthorFeed {
            post_count: page.total,
            author,
            page,
            followers_count,
            following_count,
        })
    }

    /// Posts by every author `user` follows. Following nobody yields an
    /// empty first page.
    pub async fn list_following(&self, user: &User, page: i64) -> Result<Page<PostView>> {
        self.paginate(PostFilter::FollowedBy(user.id), PROFILE_PAGE_SIZE, page)
            .await
    }
}
