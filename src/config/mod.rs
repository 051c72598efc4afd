use std::time::Duration;
use url::Url;

/// Retry behavior for a single object submission. Delays double on every
/// retry and never drop below `min_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub min_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn initial_delay(&self) -> Duration {
        self.base_delay.max(self.min_delay)
    }
}

/// Health probe budget: per-endpoint attempt count and the fixed delay
/// between attempts.
#[derive(Debug, Clone)]
pub struct ProbePolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            attempts: 100,
            delay: Duration::from_secs(1),
        }
    }
}

/// Uploader configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Objects per chunk within one type group.
    pub chunk_size: usize,
    /// Sent as `?force=0|1` on every resolved URL; instructs the backend to
    /// bypass its validation.
    pub force: bool,
    /// Injected as a `SESSION` header by the default session factory.
    pub session_token: Option<String>,
    /// Cap on concurrent in-flight requests per open session.
    pub max_connections: usize,
    pub retry: RetryPolicy,
    pub probe: ProbePolicy,
    /// Log batch progress via tracing.
    pub progress: bool,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            chunk_size: 100,
            force: false,
            session_token: None,
            max_connections: 20,
            retry: RetryPolicy::default(),
            probe: ProbePolicy::default(),
            progress: true,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_probe(mut self, probe: ProbePolicy) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}
