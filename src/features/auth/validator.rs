use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

/// Validates RS256 access tokens issued by the OIDC provider.
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Unauthorized("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?
            .claims;

        into_user(claims)
    }
}

fn into_user(claims: Claims) -> Result<AuthenticatedUser, AppError> {
    if claims.email_verified == Some(false) {
        return Err(AppError::Unauthorized("Email address is not verified".to_string()));
    }

    let email = claims
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Token has no email claim".to_string()))?;

    Ok(AuthenticatedUser {
        sub: claims.sub,
        email,
        name: claims.name,
        picture: claims.picture,
        roles: claims.roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn validator() -> JwtValidator {
        // Unreachable JWKS endpoint: tests must fail before any fetch
        let jwks = Arc::new(JwksClient::new(
            "http://127.0.0.1:9/jwks",
            Duration::from_secs(60),
        ));
        JwtValidator::new(
            jwks,
            "https://issuer.test".to_string(),
            "covergen".to_string(),
            Duration::from_secs(0),
        )
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let result = validator().validate_token("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_symmetric_algorithm_is_rejected() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("k1".to_string());
        let token = encode(
            &header,
            &json!({ "sub": "u1", "email": "a@b.c", "exp": 4_000_000_000u64 }),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        match validator().validate_token(&token).await {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("Unsupported algorithm")),
            other => panic!("unexpected result: {:?}", other.map(|u| u.email)),
        }
    }

    fn claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_claims_map_to_user() {
        let user = into_user(claims(json!({
            "sub": "u1",
            "email": " Ada@Example.com ",
            "name": "Ada",
            "roles": ["admin"]
        })))
        .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.is_admin());
    }

    #[test]
    fn test_email_is_required_and_verified() {
        assert!(into_user(claims(json!({ "sub": "u1" }))).is_err());
        assert!(into_user(claims(json!({
            "sub": "u1",
            "email": "a@b.c",
            "email_verified": false
        })))
        .is_err());
    }
}
