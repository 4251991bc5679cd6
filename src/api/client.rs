use futures::{StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response, StatusCode};
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::api::models::{RemoteRequest, Upload};
use crate::config::settings::RemoteSettings;
use crate::util::auth::ServerAuth;
use crate::util::fs::{commit, staging_file};
use crate::util::path::get_file_name;

const UPLOAD_CHUNK: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No data from server for {0:?}.")]
    Stalled(Duration),

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Thin HTTP front-end to a remote vault service. Every request carries a
/// freshly signed `auth` query parameter.
///
/// `timeout` bounds plain requests as a whole. Transfers are only bounded by
/// how long they may go without moving any data.
pub struct RemoteClient {
    base_url: String,
    http_client: reqwest::Client,
    auth: ServerAuth,
    timeout: Duration,
}

impl RemoteClient {
    pub fn new(settings: &RemoteSettings) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.timeout);
        if !settings.verify_certificate {
            log::warn!(
                "TLS certificate verification is disabled for {}",
                settings.base_url
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: settings.base_url.clone(),
            http_client: builder.build()?,
            auth: settings.auth.clone(),
            timeout: settings.timeout,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    // `auth` always goes first, then the route's own parameters
    fn build_query(&self, request: &RemoteRequest) -> Vec<(&'static str, String)> {
        let token = self.auth.sign(&request.context);
        let mut query = Vec::with_capacity(request.params.len() + 1);
        query.push(("auth", token.to_string()));
        query.extend(request.params.iter().cloned());
        query
    }

    /// GET returning the response body exactly as sent.
    pub async fn get(&self, request: &RemoteRequest) -> Result<Vec<u8>, ClientError> {
        let url = self.build_url(&request.route.path());
        log::debug!("GET {} {:?}", url, request.params);

        let response = self
            .http_client
            .get(&url)
            .query(&self.build_query(request))
            .timeout(self.timeout)
            .send()
            .await?;

        Self::read_body(response).await
    }

    /// Multipart POST: the file at `file_path` as one part, then each field.
    pub async fn post_multipart(
        &self,
        request: &RemoteRequest,
        upload: &Upload,
        file_path: &Path,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.build_url(&request.route.path());
        log::debug!("POST {} {:?}", url, upload.fields);

        let file = tokio::fs::File::open(file_path).await?;
        let length = file.metadata().await?.len();
        let sent = Arc::new(AtomicU64::new(0));
        let part = Part::stream_with_length(file_body(file, sent.clone()), length)
            .file_name(get_file_name(file_path))
            .mime_str("application/octet-stream")?;

        let mut form = Form::new().part(upload.file_field, part);
        for (key, value) in &upload.fields {
            form = form.text(*key, value.clone());
        }

        let pending = self
            .http_client
            .post(&url)
            .query(&self.build_query(request))
            .multipart(form)
            .send();
        let response = self.while_moving(&sent, pending).await?;

        if response.status() != StatusCode::OK {
            return Err(Self::error_from(response).await);
        }
        Ok(self.within(response.bytes()).await?.to_vec())
    }

    /// GET streaming a 200 body into `destination`. The data lands in a
    /// staging file beside it first, so a failed download never leaves a
    /// truncated destination behind.
    pub async fn get_to_file(
        &self,
        request: &RemoteRequest,
        destination: &Path,
    ) -> Result<u64, ClientError> {
        let url = self.build_url(&request.route.path());
        log::debug!("GET {} {:?} -> {}", url, request.params, destination.display());

        let pending = self
            .http_client
            .get(&url)
            .query(&self.build_query(request))
            .send();
        let response = self.within(pending).await?;

        if response.status() != StatusCode::OK {
            return Err(Self::error_from(response).await);
        }

        let staged = staging_file(destination)?;
        let mut file = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        let written = self.stream_to(response, &mut file).await?;
        drop(file);

        commit(staged, destination)?;
        log::info!("wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }

    async fn stream_to(
        &self,
        response: Response,
        file: &mut tokio::fs::File,
    ) -> Result<u64, ClientError> {
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let next = tokio::time::timeout(self.timeout, stream.next())
                .await
                .map_err(|_| ClientError::Stalled(self.timeout))?;
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }

    async fn within<T, F>(&self, pending: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        match tokio::time::timeout(self.timeout, pending).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ClientError::Stalled(self.timeout)),
        }
    }

    // gives up only after a whole timeout period in which `sent` did not move
    async fn while_moving<T, F>(&self, sent: &AtomicU64, pending: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        tokio::pin!(pending);
        let mut seen = sent.load(Ordering::Relaxed);
        loop {
            match tokio::time::timeout(self.timeout, &mut pending).await {
                Ok(result) => return Ok(result?),
                Err(_) => {
                    let now = sent.load(Ordering::Relaxed);
                    if now == seen {
                        return Err(ClientError::Stalled(self.timeout));
                    }
                    seen = now;
                }
            }
        }
    }

    async fn read_body(response: Response) -> Result<Vec<u8>, ClientError> {
        if response.status() != StatusCode::OK {
            return Err(Self::error_from(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    // non-empty body, else the status line ("404 Not Found")
    async fn error_from(response: Response) -> ClientError {
        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => return ClientError::Http(e),
        };
        log::debug!("server answered {}: {}", status, body);

        if body.is_empty() {
            ClientError::Remote(status.to_string())
        } else {
            ClientError::Remote(body)
        }
    }
}

// upload body that counts what the connection has taken so far
fn file_body(file: tokio::fs::File, sent: Arc<AtomicU64>) -> Body {
    let chunks = futures::stream::try_unfold(file, |mut file| async move {
        let mut buffer = vec![0u8; UPLOAD_CHUNK];
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            return Ok::<_, std::io::Error>(None);
        }
        buffer.truncate(read);
        Ok(Some((buffer, file)))
    })
    .inspect_ok(move |chunk| {
        sent.fetch_add(chunk.len() as u64, Ordering::Relaxed);
    });
    Body::wrap_stream(chunks)
}
