//! Credential handling: PBKDF2-SHA256 password hashing and the username /
//! password check that backs the session gate. Plaintext passwords are
//! never persisted or logged.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::db::repository::user::get_user_by_username;
use crate::db::DatabaseError;
use crate::session::Session;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const DIGEST_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Hash a password into the stored credential format:
/// `pbkdf2-sha256$<iterations>$<salt>$<digest>` (base64url fields).
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let digest = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "pbkdf2-sha256${PBKDF2_ITERATIONS}${}${}",
        B64.encode(salt),
        B64.encode(digest),
    )
}

/// Verify a password against a stored credential string. Malformed stored
/// values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(digest)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != "pbkdf2-sha256" || parts.next().is_some() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(digest)) else {
        return false;
    };

    let actual = derive(password, &salt, iterations);
    actual.ct_eq(&expected).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; DIGEST_LENGTH] {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut digest);
    digest
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Look up the user by exact username and verify the password against the
/// stored hash. `None` on unknown user or mismatch — callers cannot tell
/// which, by design.
pub fn authenticate(
    conn: &rusqlite::Connection,
    username: &str,
    password: &str,
) -> Result<Option<Session>, DatabaseError> {
    let Some((user, stored_hash)) = get_user_by_username(conn, username)? else {
        return Ok(None);
    };
    if !verify_password(password, &stored_hash) {
        return Ok(None);
    }
    Ok(Some(Session {
        user_id: user.id,
        username: user.username,
        role: user.role,
        full_name: user.full_name,
    }))
}
