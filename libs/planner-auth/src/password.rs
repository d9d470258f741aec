//! Salted PBKDF2-HMAC-SHA256 password hashes.
//!
//! Stored form: `pbkdf2-sha256:<iterations>$<salt>$<hash>` with both binary
//! parts in standard base64. The iteration count travels with the hash so it
//! can be raised later without invalidating existing accounts.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Hashes and verifies passwords with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub const DEFAULT_ITERATIONS: u32 = 600_000;

    #[must_use]
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash `plain` under a fresh random salt.
    #[must_use]
    pub fn hash(&self, plain: &str) -> String {
        let salt: [u8; SALT_LEN] = rand::random();
        let key = derive_key(plain, &salt, self.iterations);
        format!(
            "{SCHEME}:{}${}${}",
            self.iterations,
            B64.encode(salt),
            B64.encode(key)
        )
    }

    /// Check `plain` against a stored hash. Malformed hashes never match.
    #[must_use]
    pub fn verify(&self, plain: &str, stored: &str) -> bool {
        let Some(parsed) = StoredHash::parse(stored) else {
            tracing::debug!("stored password hash is malformed");
            return false;
        };
        let key = derive_key(plain, &parsed.salt, parsed.iterations);
        constant_time_eq(&key, &parsed.key)
    }
}

struct StoredHash {
    iterations: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl StoredHash {
    fn parse(stored: &str) -> Option<Self> {
        let rest = stored.strip_prefix(SCHEME)?.strip_prefix(':')?;
        let mut parts = rest.split('$');
        let iterations = parts.next()?.parse::<u32>().ok().filter(|n| *n > 0)?;
        let salt = B64.decode(parts.next()?).ok()?;
        let key = B64.decode(parts.next()?).ok()?;
        if parts.next().is_some() || salt.is_empty() || key.len() != KEY_LEN {
            return None;
        }
        Some(Self {
            iterations,
            salt,
            key,
        })
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

// Length is not secret; content comparison does not short-circuit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn hash_then_verify() {
        let h = hasher();
        let stored = h.hash("werkstatt-2025");
        assert!(stored.starts_with("pbkdf2-sha256:1000$"));
        assert!(h.verify("werkstatt-2025", &stored));
        assert!(!h.verify("werkstatt-2026", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let h = hasher();
        assert_ne!(h.hash("same"), h.hash("same"));
    }

    #[test]
    fn iteration_count_is_read_from_the_stored_hash() {
        let stored = PasswordHasher::new(1_500).hash("pw-12345");
        assert!(PasswordHasher::new(10).verify("pw-12345", &stored));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        let h = hasher();
        for stored in [
            "",
            "plain",
            "scrypt:1000$AAAA$BBBB",
            "pbkdf2-sha256:0$AAAA$BBBB",
            "pbkdf2-sha256:1000$not base64$BBBB",
            "pbkdf2-sha256:1000$AAAA",
        ] {
            assert!(!h.verify("x", stored), "{stored}");
        }
    }

    #[test]
    fn constant_time_eq_checks_length_and_content() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
