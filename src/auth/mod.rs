//! Access-token handling.
//!
//! The token is resolved in order of precedence:
//! 1. `MLM_CONSOLE_TOKEN` environment variable
//! 2. `<config dir>/mlm-console/token` (written by `login`, mode 0600)

pub mod login;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretBox};
use tracing::warn;

use crate::config::app_config_dir;
use crate::error::Result;

pub use login::{login, logout};

/// Environment variable that supplies an access token directly.
pub const TOKEN_ENV: &str = "MLM_CONSOLE_TOKEN";

/// Source of the bearer token attached to every authenticated request.
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` when the user is not logged in.
    fn token(&self) -> Option<SecretBox<String>>;
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the application config directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(app_config_dir()?.join("token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token read from the file only, ignoring the environment.
    pub fn stored(&self) -> Option<SecretBox<String>> {
        let content = fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(SecretBox::new(Box::new(token.to_string())))
        }
    }

    /// Persist `token`, readable by the owner only on unix.
    pub fn save(&self, token: &SecretBox<String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token.expose_secret())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&self.path, perms) {
                warn!(path = %self.path.display(), error = %e, "could not restrict token file permissions");
            }
        }

        Ok(())
    }

    /// Remove the stored token. Returns whether a file was deleted.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialProvider for TokenStore {
    fn token(&self) -> Option<SecretBox<String>> {
        if let Ok(token) = env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            return Some(SecretBox::new(Box::new(token.trim().to_string())));
        }
        self.stored()
    }
}

/// Fixed in-memory token, mostly for tests and embedding.
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider that never has a token.
    pub fn none() -> Self {
        Self { token: None }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<SecretBox<String>> {
        self.token
            .as_ref()
            .map(|t| SecretBox::new(Box::new(t.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn secret(s: &str) -> SecretBox<String> {
        SecretBox::new(Box::new(s.to_string()))
    }

    #[test]
    #[serial]
    fn test_save_load_clear() {
        unsafe { env::remove_var(TOKEN_ENV) };
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("auth").join("token"));

        assert!(store.token().is_none());
        store.save(&secret("abc123")).unwrap();
        assert_eq!(store.token().unwrap().expose_secret(), "abc123");

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert!(store.token().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.save(&secret("abc123")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    #[serial]
    fn test_env_token_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.save(&secret("from-file")).unwrap();

        // SAFETY: serialized with other env-mutating tests
        unsafe { env::set_var(TOKEN_ENV, "from-env") };
        let token = store.token();
        unsafe { env::remove_var(TOKEN_ENV) };

        assert_eq!(token.unwrap().expose_secret(), "from-env");
        assert_eq!(store.token().unwrap().expose_secret(), "from-file");
    }

    #[test]
    fn test_blank_file_is_no_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  \n").unwrap();
        assert!(TokenStore::new(path).stored().is_none());
    }

    #[test]
    fn test_static_token_debug_is_redacted() {
        let debug = format!("{:?}", StaticToken::new("hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(StaticToken::none().token().is_none());
    }
}
