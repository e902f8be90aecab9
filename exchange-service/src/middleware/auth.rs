use crate::error::AppError;
use crypto_core::jwt as core_jwt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Claims {
    pub sub: String, // subject - the user id
    pub exp: i64,    // expiration time (unix timestamp)
}

/// Validate JWT signature and extract claims (RS256 only via crypto-core)
pub async fn verify_jwt(token: &str) -> Result<Claims, AppError> {
    match core_jwt::validate_token(token) {
        Ok(token_data) => Ok(Claims {
            sub: token_data.claims.sub,
            exp: token_data.claims.exp,
        }),
        Err(_) => Err(AppError::Unauthorized),
    }
}

/// Middleware to extract the bearer token and add the user id to extensions
pub async fn auth_middleware(
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    // Introspection endpoints stay open
    let path = req.uri().path();
    if matches!(path, "/health" | "/openapi.json" | "/docs") {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_jwt(token).await?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::BadRequest("invalid user id in token".into()))?;

    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}
