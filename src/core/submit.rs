use crate::config::ClientConfig;
use crate::core::batch;
use crate::core::probe::probe;
use crate::core::session::{SessionManager, TokenSessionFactory};
use crate::domain::model::{DomainObject, Progress, SubmitMode};
use crate::domain::ports::{BackendProfile, ObjectSubmitter, SessionFactory};
use crate::utils::error::{Result, UploadError};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use url::Url;

/// The batching uploader. Owns the backend profile, the configuration, and
/// the single shared session slot.
///
/// All network operations require an open session; wrap them in
/// [`Uploader::with_session`], which opens the session, health-checks the
/// backend, and guarantees teardown on every exit path:
///
/// ```ignore
/// let results = client
///     .with_session(|| client.submit_all(&objects, SubmitMode::Create))
///     .await?;
/// ```
pub struct Uploader<P: BackendProfile> {
    profile: P,
    config: ClientConfig,
    sessions: SessionManager,
}

impl<P: BackendProfile> Uploader<P> {
    pub fn new(profile: P, config: ClientConfig) -> Self {
        let factory =
            TokenSessionFactory::new(config.session_token.clone(), config.max_connections);
        Self::with_factory(profile, config, Box::new(factory))
    }

    /// Construct with a custom session factory, e.g. one injecting
    /// externally managed credentials.
    pub fn with_factory(
        profile: P,
        config: ClientConfig,
        factory: Box<dyn SessionFactory>,
    ) -> Self {
        Self {
            profile,
            config,
            sessions: SessionManager::new(factory),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a session, probe the backend, run `scope`, and close the session
    /// again no matter how the scope exits: normal return, error, panic, or
    /// cancellation of the `with_session` future itself.
    pub async fn with_session<T, F, Fut>(&self, scope: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (session, _guard) = self.sessions.open_scoped()?;
        probe(
            &session,
            &self.config.base_url,
            &self.profile.healthchecks(),
            &self.config.probe,
        )
        .await?;
        scope().await
        // _guard tears the session down when this future is dropped.
    }

    /// Resolved target URL for one object, including the `force` query flag.
    pub fn object_url(&self, obj: &DomainObject, mode: SubmitMode) -> Result<Url> {
        let path = self.profile.routes(mode).resolve(obj)?;
        let mut url = self.config.base_url.join(&path)?;
        url.query_pairs_mut()
            .append_pair("force", if self.config.force { "1" } else { "0" });
        Ok(url)
    }

    /// Submit a single object, retrying transport failures with exponential
    /// backoff. HTTP error responses are terminal: the body's `description`
    /// field becomes the error message when present.
    pub async fn submit_one(&self, obj: &DomainObject, mode: SubmitMode) -> Result<Value> {
        let session = self.sessions.acquire()?;
        let url = self.object_url(obj, mode)?;
        let payload = self.profile.serialize(obj, mode)?;

        let retry = &self.config.retry;
        let mut delay = retry.initial_delay();
        let mut attempt = 1u32;

        loop {
            let outcome = {
                let _permit = session.reserve().await?;
                tracing::debug!(url = %url, type_tag = %obj.type_tag, attempt, "posting object");
                session.http().post(url.clone()).json(&payload).send().await
            };

            match outcome {
                Ok(response) => return decode_response(response).await,
                Err(err) if attempt < retry.max_attempts => {
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %err,
                        "transient request failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).max(retry.min_delay);
                    attempt += 1;
                }
                Err(err) => {
                    return Err(UploadError::Transient {
                        attempts: attempt,
                        source: err,
                    })
                }
            }
        }
    }

    /// Submit a heterogeneous collection: grouped by type, chunked, fanned
    /// out, and collected in completion order. Progress is logged via
    /// tracing when enabled in the configuration.
    pub async fn submit_all(&self, objs: &[DomainObject], mode: SubmitMode) -> Result<Vec<Value>> {
        let progress_on = self.config.progress;
        self.submit_all_with(objs, mode, |progress: &Progress| {
            if progress_on {
                tracing::info!(
                    completed = progress.completed,
                    total = progress.total,
                    uploading = %progress.label,
                    "batch progress"
                );
            }
        })
        .await
    }

    /// Like [`Uploader::submit_all`], reporting progress to the caller after
    /// each completed chunk.
    pub async fn submit_all_with(
        &self,
        objs: &[DomainObject],
        mode: SubmitMode,
        reporter: impl FnMut(&Progress),
    ) -> Result<Vec<Value>> {
        batch::submit_all(self, objs, mode, self.config.chunk_size, reporter).await
    }
}

#[async_trait]
impl<P: BackendProfile> ObjectSubmitter for Uploader<P> {
    fn has_route(&self, type_tag: &str, mode: SubmitMode) -> bool {
        self.profile.routes(mode).contains(type_tag)
    }

    async fn submit_one(&self, obj: &DomainObject, mode: SubmitMode) -> Result<Value> {
        self.submit_one(obj, mode).await
    }
}

async fn decode_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    // An unparseable error body still carries the status; only a parsed
    // `description` improves on it.
    let message = match response.json::<Value>().await {
        Ok(body) => body
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(_) => None,
    }
    .unwrap_or_else(|| format!("backend returned HTTP {}", status.as_u16()));

    Err(UploadError::BackendValidation {
        status: status.as_u16(),
        message,
    })
}
