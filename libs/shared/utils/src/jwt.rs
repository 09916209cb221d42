use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use chrono::{Utc, TimeZone};
use tracing::debug;
use shared_models::auth::{JwtClaims, User};

type HmacSha256 = Hmac<Sha256>;

/// Validates an HS256 Supabase access token and returns the user it names.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let mut parts = token.split('.');
    let (header_b64, claims_b64, signature_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s), None) => (h, c, s),
            _ => return Err("Invalid token format".to_string()),
        };

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        "Invalid signature encoding".to_string()
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| "Invalid claims encoding".to_string())?;

    let claims: JwtClaims = serde_json::from_str(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp().max(0) as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims
        .iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};
    use assert_matches::assert_matches;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_valid_token_round_trips_claims() {
        let doctor = TestUser::doctor("nephro@example.com");
        let token = JwtTestUtils::create_test_token(&doctor, SECRET, Some(1));

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, doctor.id);
        assert_eq!(user.email.as_deref(), Some("nephro@example.com"));
        assert_eq!(user.role.as_deref(), Some("doctor"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_rejects_bad_tokens() {
        let patient = TestUser::patient("patient@example.com");

        assert_matches!(
            validate_token(&JwtTestUtils::create_expired_token(&patient, SECRET), SECRET),
            Err(msg) if msg == "Token expired"
        );
        assert_matches!(
            validate_token(&JwtTestUtils::create_invalid_signature_token(&patient), SECRET),
            Err(msg) if msg == "Invalid token signature"
        );
        assert_matches!(
            validate_token("only.two", SECRET),
            Err(msg) if msg == "Invalid token format"
        );
        assert!(validate_token(&JwtTestUtils::create_malformed_token(), SECRET).is_err());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), SECRET, None);
        assert_matches!(validate_token(&token, ""), Err(msg) if msg == "JWT secret is not set");
    }
}
