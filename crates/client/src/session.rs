//! Session context: the cached token and identity, their storage, and change
//! notifications.
//!
//! A [`SessionContext`] is a cheap clonable handle. Every clone sees the same
//! cached state, and [`SessionContext::subscribe`] lets page state react when
//! the session changes (sign-in, profile refresh, sign-out after a 401).
//!
//! Storage sits behind [`SessionStore`]: the CLI persists to a JSON file,
//! tests use memory. Another process may rewrite the file underneath us;
//! [`SessionContext::reload`] picks that up and emits the matching event.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use petalbox_core::Identity;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::SessionError;

/// Capacity of the change channel; slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 16;

/// What storage holds for one signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: Identity,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Session change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Identity),
    Updated(Identity),
    SignedOut,
}

/// Where the session lives between runs.
pub trait SessionStore: Send + Sync {
    /// Read the stored session, `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or holds invalid data.
    fn load(&self) -> Result<Option<StoredSession>, SessionError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;

    /// Remove the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        (**self).load()
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

/// Session persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Session held in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

struct Cached {
    token: SecretString,
    identity: Identity,
}

impl Cached {
    fn from_stored(stored: StoredSession) -> Self {
        Self {
            token: SecretString::from(stored.token),
            identity: stored.user,
        }
    }

    fn same_as(&self, stored: &StoredSession) -> (bool, bool) {
        (
            self.token.expose_secret() == stored.token,
            self.identity == stored.user,
        )
    }
}

/// Shared handle on the current session.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Box<dyn SessionStore>,
    state: RwLock<Option<Cached>>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("signed_in", &self.has_token())
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Open a context over `store`, restoring any saved session.
    ///
    /// Unreadable storage is logged and treated as signed out.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        let cached = match store.load() {
            Ok(stored) => stored.map(Cached::from_stored),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable session storage");
                None
            }
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(SessionInner {
                store: Box::new(store),
                state: RwLock::new(cached),
                events,
            }),
        }
    }

    /// A context that forgets everything when dropped.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read(|cached| cached.map(|c| c.token.clone()))
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.read(|cached| cached.is_some())
    }

    /// The cached user object, if signed in.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.read(|cached| cached.map(|c| c.identity.clone()))
    }

    /// Store a new session and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted; the in-memory
    /// state is left unchanged in that case.
    pub fn sign_in(&self, token: String, identity: Identity) -> Result<(), SessionError> {
        let stored = StoredSession {
            token,
            user: identity,
        };
        self.inner.store.save(&stored)?;

        let identity = stored.user.clone();
        self.write(Some(Cached::from_stored(stored)));
        tracing::debug!(user_id = ?identity.id(), "Signed in");
        self.emit(SessionEvent::SignedIn(identity));
        Ok(())
    }

    /// Replace the cached identity, keeping the token.
    ///
    /// Does nothing when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub fn update_identity(&self, identity: Identity) -> Result<(), SessionError> {
        let Some(token) = self.token() else {
            return Ok(());
        };
        let stored = StoredSession {
            token: token.expose_secret().to_string(),
            user: identity,
        };
        self.inner.store.save(&stored)?;

        let identity = stored.user.clone();
        self.write(Some(Cached::from_stored(stored)));
        self.emit(SessionEvent::Updated(identity));
        Ok(())
    }

    /// Drop the token and identity and notify subscribers.
    ///
    /// The in-memory session is cleared even if storage cannot be.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be removed.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        let was_signed_in = self.has_token();
        self.write(None);
        if was_signed_in {
            tracing::debug!("Signed out");
            self.emit(SessionEvent::SignedOut);
        }
        self.inner.store.clear()
    }

    /// Receive session changes from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Re-read storage and adopt any change made by another process.
    ///
    /// Returns the event emitted, if the session changed.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn reload(&self) -> Result<Option<SessionEvent>, SessionError> {
        let stored = self.inner.store.load()?;

        let event = self.read(|cached| match (cached, &stored) {
            (None, None) => None,
            (Some(_), None) => Some(SessionEvent::SignedOut),
            (None, Some(s)) => Some(SessionEvent::SignedIn(s.user.clone())),
            (Some(c), Some(s)) => match c.same_as(s) {
                (true, true) => None,
                (true, false) => Some(SessionEvent::Updated(s.user.clone())),
                (false, _) => Some(SessionEvent::SignedIn(s.user.clone())),
            },
        });

        if let Some(event) = &event {
            tracing::debug!(?event, "Session changed in storage");
            self.write(stored.map(Cached::from_stored));
            self.emit(event.clone());
        }
        Ok(event)
    }

    fn read<R>(&self, f: impl FnOnce(Option<&Cached>) -> R) -> R {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }

    fn write(&self, next: Option<Cached>) {
        *self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}
