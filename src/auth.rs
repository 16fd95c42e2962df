//! Identity: password hashing and JWT bearer tokens.

use axum::headers::{authorization::Bearer, Authorization};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};
use pwhash::bcrypt;
use serde::{Deserialize, Serialize};

use crate::errors::CustomError;

// The claims struct used for creating a Bearer token
#[derive(Deserialize, Serialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub admin: bool,
}

pub fn hash_password(password: &str) -> Result<String, CustomError> {
    bcrypt::hash(password).map_err(|err| {
        error!("Unexpected error encrypting password {:?}", err);
        CustomError::InternalServerError
    })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash)
}

// Generate a Bearer token for `user_name`, valid for `duration` seconds
pub fn issue_token(secret: &str, duration: i64, user_name: &str, admin: bool) -> Result<String, CustomError> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::seconds(duration))
        .ok_or(CustomError::InternalServerError)?
        .timestamp();

    let claims = Claims {
        sub: user_name.to_string(),
        iat: now.timestamp() as usize,
        exp: exp as usize,
        admin,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).map_err(|err| {
        error!("Unexpected error while encoding the bearer token ({:?})", err);
        CustomError::InternalServerError
    })
}

// Check if a bearer token is valid (user is logged in). Returns the user name and admin flag.
pub fn check_access(secret: &str, bearer: &Authorization<Bearer>) -> Result<(String, bool), CustomError> {
    match decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(token_data) => {
            debug!("Token accepted for {}", token_data.claims.sub);
            Ok((token_data.claims.sub, token_data.claims.admin))
        }
        Err(err) => {
            error!("Invalid token: {:?}", err.kind());
            Err(CustomError::InvalidToken)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_are_accepted() {
        let token = issue_token("secret", 60, "ann", false).unwrap();
        let bearer = Authorization::bearer(&token).unwrap();
        let (user, admin) = check_access("secret", &bearer).unwrap();
        assert_eq!(user, "ann");
        assert!(!admin);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_refused() {
        let token = issue_token("secret", 60, "ann", true).unwrap();
        let bearer = Authorization::bearer(&token).unwrap();
        assert!(matches!(check_access("other", &bearer), Err(CustomError::InvalidToken)));
    }

    #[test]
    fn expired_tokens_are_refused() {
        let token = issue_token("secret", -3600, "ann", false).unwrap();
        let bearer = Authorization::bearer(&token).unwrap();
        assert!(matches!(check_access("secret", &bearer), Err(CustomError::InvalidToken)));
    }

    #[test]
    fn passwords_verify_against_their_hash() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }
}
