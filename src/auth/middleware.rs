//! Authentication middleware
//!
//! Protects routes that require authentication.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use super::token::verify_access_token;
use crate::AppState;
use crate::data::{User, normalize_email};
use crate::error::AppError;

/// Authenticated caller identity, resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity provider's stable user ID
    pub id: String,
    /// Normalized email
    pub email: String,
    pub display_name: Option<String>,
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// Verify the token and mirror the caller into the local users table.
///
/// The mirror is what friend-request email lookups resolve against,
/// so it is refreshed on every authenticated request.
async fn authenticate_token(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims = verify_access_token(token, &state.config.auth.token_secret)?;

    let user = AuthUser {
        id: claims.sub,
        email: normalize_email(&claims.email),
        display_name: claims.name,
    };

    let now = Utc::now();
    state
        .db
        .upsert_user(&User {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(user)
}

/// Middleware to require authentication
///
/// Extracts and verifies the bearer token from the Authorization
/// header. Adds AuthUser to request extensions if valid.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/api/...", ...)
///     .layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let user = authenticate_token(&token, &state).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor for the current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    /// Extract current user from request
    ///
    /// Reuses the identity placed in extensions by `require_auth`, and
    /// falls back to verifying the header directly so handlers work
    /// without the middleware layer too.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>().cloned() {
            return Ok(CurrentUser(user));
        }

        let app_state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = authenticate_token(&token, &app_state).await?;
        parts.extensions.insert(user.clone());

        Ok(CurrentUser(user))
    }
}
