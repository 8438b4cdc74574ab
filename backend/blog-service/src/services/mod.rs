/// Business logic layer for blog-service
///
/// - `pagination`: 1-based page arithmetic with clamping
/// - `feed`: post listings for the home, group, profile and following pages
/// - `access`: permission checks and follow/unfollow
/// - `session`: signed session cookies and password hashing
/// - `media`: storage of uploaded post images
pub mod access;
pub mod feed;
pub mod media;
pub mod pagination;
pub mod session;

pub use access::{AccessControl, FollowOutcome};
pub use feed::{AuthorFeed, FeedService};
pub use media::MediaStorage;
pub use pagination::{Page, PageQuery, Paginator};
pub use session::SessionKeys;
