use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use rand::Rng;

const TOKEN_PREFIX: &str = "session_";
const TOKEN_RANDOM_LEN: usize = 9;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque conversation token echoed to the backend as `thread_id`.
///
/// Generated once and persisted next to the config file, so restarting the
/// console continues the same backend thread. Deleting the file starts a
/// fresh conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..TOKEN_RANDOM_LEN)
            .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
            .collect();
        Self(format!("{TOKEN_PREFIX}{suffix}"))
    }

    /// Reads the token stored in `dir`, generating and persisting a new one
    /// if none exists. Generation itself cannot fail; if the token cannot be
    /// written back the fresh token is still used for this run.
    pub fn load_or_create(dir: &Path) -> Self {
        let path = dir.join("session");

        if let Ok(contents) = fs::read_to_string(&path) {
            let stored = contents.trim();
            if !stored.is_empty() {
                return Self(stored.to_string());
            }
        }

        let token = Self::generate();
        if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&path, token.as_str())) {
            tracing::warn!("could not persist session token: {e}");
        }
        token
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Directory holding the session token and config file.
pub fn state_dir() -> Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("titan-console"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_expected_shape() {
        let token = SessionToken::generate();
        let suffix = token.as_str().strip_prefix(TOKEN_PREFIX).unwrap();
        assert_eq!(suffix.len(), TOKEN_RANDOM_LEN);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn token_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let first = SessionToken::load_or_create(dir.path());
        let second = SessionToken::load_or_create(dir.path());
        assert_eq!(first, second);
    }

    #[test]
    fn blank_token_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("session"), "  \n").unwrap();
        let token = SessionToken::load_or_create(dir.path());
        assert!(token.as_str().starts_with(TOKEN_PREFIX));
        // The fresh token must be the one now on disk.
        let reloaded = SessionToken::load_or_create(dir.path());
        assert_eq!(token, reloaded);
    }

    #[test]
    fn distinct_generations_rarely_collide() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
    }
}
