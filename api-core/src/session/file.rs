use super::{
    SessionError, SessionState, SessionStore, TokenCookie, UserProfile, AUTH_TOKEN_COOKIE,
    USER_DATA_KEY,
};
use chrono::Duration;
use reqwest::Url;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Session persisted under a per-origin directory:
///
/// ```text
/// <root>/<host>_<port>/auth_token.json   cookie record with expiry
/// <root>/<host>_<port>/user_data.json    cached profile
/// ```
///
/// Files are read once on open; the in-memory copy serves all reads. On
/// unix the directory is owner-only (0700) and the files 0600.
#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
    state: RwLock<SessionState>,
}

impl FileSessionStore {
    pub fn open(root: &Path, origin: &Url) -> Result<Self, SessionError> {
        let dir = root.join(origin_key(origin));
        create_private_dir(&dir)?;

        let mut token = read_json::<TokenCookie>(&dir.join(token_file()));
        if token.as_ref().is_some_and(TokenCookie::is_expired) {
            tracing::debug!(dir = %dir.display(), "Discarding expired auth token");
            remove_if_exists(&dir.join(token_file()))?;
            token = None;
        }
        let profile = read_json::<UserProfile>(&dir.join(profile_file()));

        Ok(Self {
            dir,
            state: RwLock::new(SessionState { token, profile }),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<Secret<String>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .live_token()
    }

    fn set_token(&self, token: Secret<String>, ttl: Duration) -> Result<(), SessionError> {
        let cookie = TokenCookie::new(token.expose_secret().clone(), ttl);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        write_json(&self.dir.join(token_file()), &cookie)?;
        state.token = Some(cookie);
        Ok(())
    }

    fn cached_profile(&self) -> Option<UserProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile
            .clone()
    }

    fn set_cached_profile(&self, profile: UserProfile) -> Result<(), SessionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        write_json(&self.dir.join(profile_file()), &profile)?;
        state.profile = Some(profile);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // The token file goes first; until it is gone the session stands.
        // A leftover profile file is harmless since it is never trusted
        // without a token.
        remove_if_exists(&self.dir.join(token_file()))?;
        let profile_result = remove_if_exists(&self.dir.join(profile_file()));
        *state = SessionState::default();
        profile_result
    }
}

fn token_file() -> String {
    format!("{}.json", AUTH_TOKEN_COOKIE)
}

fn profile_file() -> String {
    format!("{}.json", USER_DATA_KEY)
}

fn origin_key(origin: &Url) -> String {
    let host = origin.host_str().unwrap_or("local");
    let key = match origin.port_or_known_default() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    };
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '-' })
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read session file");
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
            None
        }
    }
}

fn create_private_dir(dir: &Path) -> Result<(), SessionError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
        builder.mode(0o700);
        builder.create(dir)?;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    #[cfg(not(unix))]
    builder.create(dir)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    // A stale tmp file would keep whatever mode it was created with.
    remove_if_exists(&tmp)?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&tmp)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), SessionError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
