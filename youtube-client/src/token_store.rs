use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use sweeper_core::{CoreError, Credential};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Single-file persistence for the active OAuth credential.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when no token has been saved yet. A file that
    /// exists but does not parse is an error.
    pub fn load(&self) -> Result<Option<Credential>, CoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "No existing token found at {}. Authentication required.",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let credential: Credential = serde_json::from_reader(BufReader::new(file))?;
        info!("Token loaded from {}", self.path.display());
        Ok(Some(credential))
    }

    /// Writes to a sibling temp file and renames it over the target, so
    /// readers see either the old credential or the complete new one.
    pub fn save(&self, credential: &Credential) -> Result<(), CoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        // Dropping `tmp` on any early return deletes it. It is created 0600 on Unix.
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, credential)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!("Token stored at {}", self.path.display());
        Ok(())
    }

    /// Removes the token file. Returns whether a file was present.
    pub fn clear(&self) -> Result<bool, CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Token removed from {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No token to remove at {}", self.path.display());
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_credential(access_token: &str) -> Credential {
        Credential {
            access_token: access_token.to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry: Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()),
            scope: Some("https://www.googleapis.com/auth/youtube.force-ssl".to_string()),
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let credential = sample_credential("ya29.first");

        store.save(&credential).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential));
    }

    #[test]
    fn test_save_replaces_whole_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));

        store.save(&sample_credential("ya29.first")).unwrap();
        let mut second = sample_credential("ya29.second");
        second.refresh_token = None;
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("state").join("token.json"));
        store.save(&sample_credential("ya29.nested")).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{\"access_token\": ").unwrap();

        let store = TokenStore::new(&path);
        assert!(matches!(store.load(), Err(CoreError::Serialization(_))));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        assert!(!store.clear().unwrap());

        store.save(&sample_credential("ya29.gone")).unwrap();
        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&sample_credential("ya29.private")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
