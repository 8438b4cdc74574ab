/// Request-scoped identity for blog-service
///
/// [`Actor`] is extracted in every handler. It resolves the session cookie
/// to a [`User`]; a missing, forged or expired cookie yields an anonymous
/// actor rather than an error.
use crate::error::{AppError, Result};
use crate::models::User;
use crate::state::AppState;
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

/// The user a request acts as, or `None` when anonymous.
#[derive(Debug, Clone)]
pub struct Actor(pub Option<User>);

impl Actor {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// The logged-in user, or `AuthRequired` pointing back at `next`.
    pub fn require(&self, next: &str) -> Result<&User> {
        self.0.as_ref().ok_or_else(|| AppError::auth_required(next))
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = state.as_ref().and_then(|s| {
            req.cookie(s.sessions.cookie_name())
                .map(|c| c.value().to_string())
        });

        Box::pin(async move {
            let (Some(state), Some(token)) = (state, token) else {
                return Ok(Actor(None));
            };
            let Some(user_id) = state.sessions.decode(&token) else {
                tracing::debug!("Ignoring invalid session cookie");
                return Ok(Actor(None));
            };

            let user = state.store.find_user_by_id(user_id).await?;
            if user.is_none() {
                tracing::debug!(user_id, "Session refers to a missing user");
            }
            Ok(Actor(user))
        })
    }
}
