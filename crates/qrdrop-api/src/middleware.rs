use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use qrdrop_types::access::Session;
use qrdrop_types::api::Claims;

use crate::auth::AppState;

/// Tokens stay valid for 30 days; logging out means discarding the token.
const TOKEN_LIFETIME_DAYS: i64 = 30;

/// Resolve the bearer token into a `Session` and attach it to the request.
///
/// Missing or invalid tokens yield an anonymous session rather than a
/// rejection; handlers decide what an anonymous caller may do.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = session_from_headers(req.headers(), &state.jwt_secret);
    req.extensions_mut().insert(session);
    next.run(req).await
}

pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Session {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
    else {
        return Session::anonymous();
    };

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Session::logged_in(data.claims.sub),
        Err(e) => {
            debug!("Ignoring invalid bearer token: {}", e);
            Session::anonymous()
        }
    }
}

pub fn create_token(secret: &str, account_id: i64, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: account_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn valid_token_logs_in() {
        let token = create_token("secret", 12, "a@example.com").unwrap();
        assert_eq!(session_from_headers(&bearer(&token), "secret"), Session::logged_in(12));
    }

    #[test]
    fn wrong_secret_is_anonymous() {
        let token = create_token("secret", 12, "a@example.com").unwrap();
        assert_eq!(session_from_headers(&bearer(&token), "other"), Session::anonymous());
    }

    #[test]
    fn missing_or_malformed_header_is_anonymous() {
        assert_eq!(session_from_headers(&HeaderMap::new(), "secret"), Session::anonymous());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(session_from_headers(&headers, "secret"), Session::anonymous());
        assert_eq!(session_from_headers(&bearer("not-a-jwt"), "secret"), Session::anonymous());
    }
}
