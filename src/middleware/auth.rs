use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;
use actix_web::{Error, HttpMessage, HttpRequest, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, Validation, decode};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub exp: usize,
}

fn jwt_secret(req: &ServiceRequest) -> String {
    match req.app_data::<web::Data<AppConfig>>() {
        Some(config) => config.jwt_secret.clone(),
        None => std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
    }
}

/// Verify the bearer JWT and attach its claims to the request.
/// A request without credentials is rejected with the JSON error envelope.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(credentials) = credentials else {
        return Err((
            CustomError::UnauthorizedError("Not authenticated".to_string()).into(),
            req,
        ));
    };
    let secret = jwt_secret(&req);

    match decode::<Claims>(
        credentials.token(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            Ok(req)
        }
        Err(e) => {
            warn!("Rejected bearer token: {}", e);
            Err((
                CustomError::UnauthorizedError("Invalid token".to_string()).into(),
                req,
            ))
        }
    }
}

/// Claims of the authenticated caller (use after auth middleware)
pub fn claims_from_request(req: &HttpRequest) -> Result<Claims, CustomError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".to_string()))
}

/// Sign a token for tests
#[cfg(test)]
pub fn create_token(user_id: &str, username: &str, secret: &str) -> String {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        username: username.to_owned(),
        exp: expiration,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}
