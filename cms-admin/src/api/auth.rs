//! Session gate
//!
//! Resolves the session cookie against the content API and stores the
//! resulting [`SessionUser`] in the request extensions. Unknown sessions are
//! redirected to `/sign-in` (pages) or answered with 401 (API).

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::backend::SessionUser;
use crate::error::ApiError;
use crate::AppState;

/// Value of cookie `name` in a `Cookie` header
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn reject(is_api: bool, reason: &str) -> Response {
    debug!(reason, "Rejecting request without a valid session");
    if is_api {
        ApiError::Unauthorized(reason.to_string()).into_response()
    } else {
        Redirect::to("/sign-in").into_response()
    }
}

/// Session middleware
///
/// Applied to protected routes only. With `auth_disabled` every request runs
/// as [`SessionUser::local_admin`].
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if state.settings.auth_disabled {
        request.extensions_mut().insert(SessionUser::local_admin());
        return next.run(request).await;
    }

    let is_api = request.uri().path().starts_with("/api/");
    let session = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookies| cookie_value(cookies, &state.settings.session_cookie))
        .map(str::to_string);

    let Some(session) = session else {
        return reject(is_api, "No session cookie");
    };

    match state.backend.current_user(&session).await {
        Ok(Some(user)) => {
            debug!(user = %user.email, role = ?user.role, "Session resolved");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => reject(is_api, "Unknown session"),
        Err(e) => ApiError::Upstream(e).into_response(),
    }
}
