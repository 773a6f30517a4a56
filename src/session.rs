//! Password hashing and cookie-session helpers.
//!
//! Identity lives in the signed actix cookie session as a single `user_id`
//! entry; everything else about the client is loaded per request by
//! [`crate::middleware::ClientCtx`].

use actix_session::Session;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use once_cell::sync::Lazy;

const SESSION_USER_KEY: &str = "user_id";

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

pub fn get_argon2() -> &'static Argon2<'static> {
    &ARGON2
}

/// Hashes a plain text password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(get_argon2()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks a plain text password against a stored PHC string.
/// Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => get_argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("verify_password: stored hash is malformed: {}", e);
            false
        }
    }
}

/// Returns the id of the logged in user, if any.
pub fn get_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(SESSION_USER_KEY) {
        Ok(id) => id,
        Err(e) => {
            log::warn!("get_user_id: unreadable session entry: {}", e);
            None
        }
    }
}

pub fn login(session: &Session, user_id: i32) -> Result<(), actix_web::Error> {
    session.renew();
    session
        .insert(SESSION_USER_KEY, user_id)
        .map_err(actix_web::error::ErrorInternalServerError)
}

pub fn logout(session: &Session) {
    session.purge();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
