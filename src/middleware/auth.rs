use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::config::AppConfig;
use crate::models::user::UserRole;

/// Name of the httpOnly cookie the storefront login sets
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Verifies (and, for tooling and tests, issues) HS256 tokens.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn generate_token(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp().max(0) as usize;

        // Admin sessions: 2 hours, customers: 24 hours
        let exp = if role.is_admin() {
            now + 2 * 60 * 60
        } else {
            now + 24 * 60 * 60
        };

        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            email: email.to_string(),
            role,
            exp,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }

    pub fn extract_token_from_header(auth_header: &str) -> Option<&str> {
        auth_header.strip_prefix("Bearer ")
    }
}

pub async fn auth_middleware(
    State(config): State<AppConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let jwt_service = JwtService::new(&config.jwt_secret);

    // Cookie first, Authorization header as fallback for API clients
    let cookie_jar = CookieJar::from_headers(request.headers());
    let token = match cookie_jar.get(AUTH_COOKIE) {
        Some(cookie) => Some(cookie.value().to_string()),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(JwtService::extract_token_from_header)
            .map(str::to_string),
    };

    let Some(token) = token else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    match jwt_service.validate_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!("Rejected token: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
