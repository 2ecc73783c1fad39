//! Caller identity extraction from a JWT Bearer token or `X-User` headers (dev mode).

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use lms_store::lms_core::{Caller, Role};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Header naming the user in dev mode.
pub const DEV_USER_HEADER: &str = "x-user";

/// Comma-separated role names in dev mode.
pub const DEV_ROLES_HEADER: &str = "x-roles";

/// JWT claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User email (subject).
    pub sub: String,
    /// Site-wide role names.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration time (unix timestamp).
    pub exp: usize,
    /// Issued at (unix timestamp).
    #[serde(default)]
    pub iat: usize,
}

/// The authenticated caller.
///
/// Resolution order:
/// 1. `Authorization: Bearer <jwt>`, HS256-signed with `JWT_SECRET`.
/// 2. `X-User` and optional `X-Roles`, only when `ALLOW_DEV_IDENTITY` is set.
/// 3. Otherwise `Unauthorized`.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Caller);

impl CallerIdentity {
    pub fn caller(&self) -> &Caller {
        &self.0
    }
}

/// Create a signed token for `caller`.
pub fn create_token(caller: &Caller, secret: &str, expiry_hours: i64) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let exp = (now + chrono::Duration::hours(expiry_hours)).timestamp();

    let claims = Claims {
        sub: caller.user.clone(),
        roles: caller.roles.iter().map(|r| r.as_str().to_string()).collect(),
        exp: usize::try_from(exp).unwrap_or_default(),
        iat: usize::try_from(now.timestamp()).unwrap_or_default(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
}

/// Validate a token and build the caller it names.
pub fn validate_token(token: &str, secret: &str) -> Result<Caller, ApiError> {
    if secret.is_empty() {
        return Err(ApiError::Unauthorized(
            "token authentication is not configured".into(),
        ));
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized(format!("Invalid token: {}", e))
    })?;

    if data.claims.sub.trim().is_empty() {
        return Err(ApiError::Unauthorized("token has an empty subject".into()));
    }

    let roles = parse_roles(data.claims.roles.iter().map(String::as_str));
    Ok(Caller::new(data.claims.sub, roles))
}

/// Parse role names, skipping ones this server does not know.
fn parse_roles<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<Role> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring role");
                None
            }
        })
        .collect()
}

fn resolve(parts: &Parts, config: &ServerConfig) -> Result<Caller, ApiError> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| {
            ApiError::Unauthorized("Authorization header contains invalid characters".into())
        })?;
        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Authorization header must be Bearer <token>".into())
        })?;
        return validate_token(token.trim(), &config.jwt_secret);
    }

    if config.allow_dev_identity {
        if let Some(user) = parts.headers.get(DEV_USER_HEADER) {
            let user = user
                .to_str()
                .map_err(|_| ApiError::BadRequest("X-User header contains invalid characters".into()))?
                .trim();
            if !user.is_empty() {
                let roles = parts
                    .headers
                    .get(DEV_ROLES_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| parse_roles(v.split(',')))
                    .unwrap_or_default();
                tracing::debug!(user, "Using dev identity from X-User header");
                return Ok(Caller::new(user, roles));
            }
        }
    }

    Err(ApiError::Unauthorized(
        "Missing Authorization: Bearer <jwt> header".into(),
    ))
}

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state.config()).map(CallerIdentity)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::http::Request;

    use super::*;
    use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, LogFormat};

    fn test_config(secret: &str, allow_dev: bool) -> ServerConfig {
        ServerConfig {
            database_url: String::new(),
            port: 3000,
            log_level: "info".into(),
            log_format: LogFormat::Text,
            cors_allowed_origins: "*".into(),
            public_root: PathBuf::from("public"),
            private_root: PathBuf::from("private"),
            jwt_secret: secret.into(),
            allow_dev_identity: allow_dev,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/courses");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_create_and_validate_token() {
        let caller = Caller::new("instructor@example.com", [Role::CourseCreator]);
        let token = create_token(&caller, "secret", 1).unwrap();

        let decoded = validate_token(&token, "secret").unwrap();
        assert_eq!(decoded, caller);
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let caller = Caller::new("a@example.com", [Role::Moderator]);
        let token = create_token(&caller, "secret1", 1).unwrap();
        assert!(matches!(
            validate_token(&token, "secret2"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_unknown_roles_are_skipped() {
        let roles = parse_roles(["Moderator", "Website Manager", " LMS Student ", ""]);
        assert_eq!(roles, vec![Role::Moderator, Role::LmsStudent]);
    }

    #[test]
    fn test_bearer_token_resolves_caller() {
        let config = test_config("secret", false);
        let caller = Caller::new("eval@example.com", [Role::BatchEvaluator]);
        let token = create_token(&caller, "secret", 1).unwrap();
        let auth = format!("Bearer {}", token);

        let resolved = resolve(&parts(&[("authorization", &auth)]), &config).unwrap();
        assert_eq!(resolved, caller);
    }

    #[test]
    fn test_dev_headers_require_flag() {
        let headers = [("x-user", "dev@example.com"), ("x-roles", "Moderator, Course Creator")];

        let denied = resolve(&parts(&headers), &test_config("", false));
        assert!(matches!(denied, Err(ApiError::Unauthorized(_))));

        let caller = resolve(&parts(&headers), &test_config("", true)).unwrap();
        assert_eq!(caller.user, "dev@example.com");
        assert!(caller.has_role(Role::Moderator));
        assert!(caller.has_role(Role::CourseCreator));
    }

    #[test]
    fn test_missing_credentials_unauthorized() {
        let result = resolve(&parts(&[]), &test_config("secret", true));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_token_rejected_without_secret() {
        let result = resolve(
            &parts(&[("authorization", "Bearer abc")]),
            &test_config("", true),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
