use crate::domain::ports::SessionFactory;
use crate::utils::error::{Result, UploadError};
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Shared handle to an open network session: the HTTP client plus the
/// limiter capping concurrent in-flight requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    limiter: Arc<Semaphore>,
}

impl Session {
    pub fn new(http: reqwest::Client, max_connections: usize) -> Self {
        Self {
            http,
            limiter: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Reserve a connection slot; held for the duration of one network write.
    pub async fn reserve(&self) -> Result<SemaphorePermit<'_>> {
        self.limiter
            .acquire()
            .await
            .map_err(|_| UploadError::NotInitialized)
    }
}

/// Owns the single shared session slot. Only this type creates or destroys
/// sessions; everything else acquires a read-only clone of the handle.
///
/// The slot is a synchronous mutex so [`SessionGuard`] can clear it from
/// `Drop`, which is what keeps teardown working when the surrounding future
/// is cancelled or panics.
pub struct SessionManager {
    factory: Box<dyn SessionFactory>,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(factory: Box<dyn SessionFactory>) -> Self {
        Self {
            factory,
            current: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build a session via the factory and store it as the shared handle.
    /// At most one session may be open per manager.
    pub fn open(&self) -> Result<Session> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(UploadError::SessionAlreadyOpen);
        }
        let session = self.factory.build()?;
        tracing::debug!("client session opened");
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Open the slot and return a guard that clears it again on drop, no
    /// matter how the owning scope exits.
    pub fn open_scoped(&self) -> Result<(Session, SessionGuard<'_>)> {
        let session = self.open()?;
        Ok((session, SessionGuard { manager: self }))
    }

    /// Current handle, or [`UploadError::NotInitialized`]. Never opens a
    /// session implicitly.
    pub fn acquire(&self) -> Result<Session> {
        self.slot().clone().ok_or(UploadError::NotInitialized)
    }

    /// Drop the shared handle. Idempotent.
    pub fn close(&self) {
        if self.slot().take().is_some() {
            tracing::debug!("client session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.slot().is_some()
    }
}

/// Closes the manager's session when dropped, covering normal returns,
/// errors, panics, and cancelled futures alike.
pub struct SessionGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.manager.close();
    }
}

/// Default [`SessionFactory`]: injects an opaque session token as a
/// `SESSION` header and caps the connection pool.
#[derive(Debug, Clone)]
pub struct TokenSessionFactory {
    token: Option<String>,
    max_connections: usize,
}

impl TokenSessionFactory {
    pub fn new(token: Option<String>, max_connections: usize) -> Self {
        Self {
            token,
            max_connections,
        }
    }
}

impl SessionFactory for TokenSessionFactory {
    fn build(&self) -> Result<Session> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(self.max_connections);

        if let Some(token) = &self.token {
            let mut headers = HeaderMap::new();
            let value = HeaderValue::from_str(token).map_err(|err| UploadError::Session {
                reason: format!("invalid session token: {err}"),
            })?;
            headers.insert("SESSION", value);
            builder = builder.default_headers(headers);
        }

        let http = builder.build().map_err(|err| UploadError::Session {
            reason: err.to_string(),
        })?;
        Ok(Session::new(http, self.max_connections))
    }
}
