/// Permission checks and follow-edge management.
///
/// The `can_*` checks are pure functions of the [`Actor`]; `follow` and
/// `unfollow` go through the store and rely on its unique follow pair.
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::Actor;
use crate::models::{PostView, User};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// Following yourself is silently ignored
    SelfFollow,
}

#[derive(Clone)]
pub struct AccessControl {
    store: Arc<dyn Store>,
}

impl AccessControl {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn can_edit_post(actor: &Actor, post: &PostView) -> bool {
        actor.user().is_some_and(|u| u.id == post.author_id)
    }

    pub fn can_create_post(actor: &Actor) -> bool {
        actor.is_authenticated()
    }

    pub fn can_comment(actor: &Actor) -> bool {
        actor.is_authenticated()
    }

    pub fn can_follow(actor: &Actor) -> bool {
        actor.is_authenticated()
    }

    pub fn can_view_following_feed(actor: &Actor) -> bool {
        actor.is_authenticated()
    }

    /// Get-or-create the edge `actor -> target_username`.
    pub async fn follow(&self, actor: &User, target_username: &str) -> Result<FollowOutcome> {
        let author = self
            .store
            .find_user_by_username(target_username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {target_username}")))?;

        if author.username == actor.username {
            return Ok(FollowOutcome::SelfFollow);
        }

        if self.store.is_following(actor.id, author.id).await? {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        match self.store.create_follow(actor.id, author.id).await {
            Ok(()) => {
                tracing::info!(user_id = actor.id, author_id = author.id, "Follow created");
                Ok(FollowOutcome::Created)
            }
            // Lost the race against a concurrent follow of the same pair
            Err(AppError::Conflict(_)) => Ok(FollowOutcome::AlreadyFollowing),
            Err(e) => Err(e),
        }
    }

    pub async fn unfollow(&self, actor: &User, target_username: &str) -> Result<()> {
        let author = self
            .store
            .find_user_by_username(target_username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {target_username}")))?;

        if !self.store.delete_follow(actor.id, author.id).await? {
            return Err(AppError::not_found(format!(
                "follow {} -> {}",
                actor.username, author.username
            )));
        }

        tracing::info!(user_id = actor.id, author_id = author.id, "Follow removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::FaultyStore;
    use crate::db::MemoryStore;
    use chrono::Utc;

    fn view_by(author_id: i64) -> PostView {
        PostView {
            id: 1,
            text: "text".into(),
            pub_date: Utc::now(),
            image: None,
            author_id,
            author_username: "author".into(),
            group_id: None,
            group_slug: None,
            group_title: None,
            comment_count: 0,
        }
    }

    async fn setup() -> (Arc<dyn Store>, User, User) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let follower = store.create_user("follower", "x").await.unwrap();
        let author = store.create_user("author", "x").await.unwrap();
        (store, follower, author)
    }

    #[tokio::test]
    async fn only_the_author_may_edit() {
        let (_, follower, author) = setup().await;
        let post = view_by(author.id);

        assert!(AccessControl::can_edit_post(&Actor(Some(author)), &post));
        assert!(!AccessControl::can_edit_post(&Actor(Some(follower)), &post));
        assert!(!AccessControl::can_edit_post(&Actor(None), &post));
    }

    #[test]
    fn anonymous_actor_is_denied() {
        let anon = Actor(None);
        assert!(!AccessControl::can_create_post(&anon));
        assert!(!AccessControl::can_comment(&anon));
        assert!(!AccessControl::can_follow(&anon));
        assert!(!AccessControl::can_view_following_feed(&anon));
    }

    #[tokio::test]
    async fn following_twice_creates_one_edge() {
        let (store, follower, author) = setup().await;
        let access = AccessControl::new(store.clone());

        assert_eq!(
            access.follow(&follower, "author").await.unwrap(),
            FollowOutcome::Created
        );
        assert_eq!(
            access.follow(&follower, "author").await.unwrap(),
            FollowOutcome::AlreadyFollowing
        );
        assert_eq!(store.count_followers(author.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn self_follow_is_a_no_op() {
        let (store, follower, _) = setup().await;
        let access = AccessControl::new(store.clone());

        assert_eq!(
            access.follow(&follower, "follower").await.unwrap(),
            FollowOutcome::SelfFollow
        );
        assert_eq!(store.count_following(follower.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let (store, follower, _) = setup().await;
        let access = AccessControl::new(store);
        assert!(access.follow(&follower, "ghost").await.unwrap_err().is_not_found());
        assert!(access.unfollow(&follower, "ghost").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unfollow_twice_is_not_found() {
        let (store, follower, author) = setup().await;
        let access = AccessControl::new(store.clone());

        access.follow(&follower, "author").await.unwrap();
        access.unfollow(&follower, "author").await.unwrap();
        assert_eq!(store.count_followers(author.id).await.unwrap(), 0);

        assert!(access.unfollow(&follower, "author").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn losing_the_follow_race_counts_as_already_following() {
        let store: Arc<dyn Store> = Arc::new(FaultyStore {
            stale_follow_check: true,
            ..FaultyStore::default()
        });
        let follower = store.create_user("follower", "x").await.unwrap();
        let author = store.create_user("author", "x").await.unwrap();
        store.create_follow(follower.id, author.id).await.unwrap();

        let outcome = AccessControl::new(store.clone())
            .follow(&follower, "author")
            .await
            .unwrap();

        assert_eq!(outcome, FollowOutcome::AlreadyFollowing);
        assert_eq!(store.count_followers(author.id).await.unwrap(), 1);
    }
}
