use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned by a [`Fetch`] implementation.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP request for {url} failed with status: {status}")]
    Status { url: String, status: StatusCode },
}

/// Retrieves the complete body behind a URL.
///
/// No streaming and no partial content: the whole archive is returned or the
/// call fails.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Fetch`] over plain HTTP(S) GET requests
pub struct HttpFetcher {
    client: Client,
    max_retry: u32,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    ///
    /// Timeouts and connection failures are retried up to `max_retry` times
    /// with a linearly growing pause; every other failure is returned at once.
    pub fn new(timeout: Duration, max_retry: u32) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, max_retry))
    }

    /// Use a preconfigured client, for custom proxy or TLS settings.
    pub fn with_client(client: Client, max_retry: u32) -> Self {
        Self { client, max_retry }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut retry_count = 0;

        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status,
                        });
                    }

                    let body = resp.bytes().await?;
                    debug!(url, bytes = body.len(), "fetched remote archive");
                    return Ok(body.to_vec());
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && retry_count < self.max_retry => {
                    retry_count += 1;
                    warn!(
                        url,
                        "connection error, retry {}/{}: {}", retry_count, self.max_retry, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(retry_count))).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fetcher(timeout: Duration, max_retry: u32) -> HttpFetcher {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        HttpFetcher::with_client(client, max_retry)
    }

    /// Answer every connection with `response` and count the connections.
    async fn serve(response: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/book.epub", listener.local_addr().unwrap());
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (url, accepted)
    }

    #[tokio::test]
    async fn returns_the_whole_body() {
        let (url, _) =
            serve("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello").await;
        let body = fetcher(Duration::from_secs(5), 0).fetch(&url).await.unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let (url, accepted) =
            serve("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;
        let err = fetcher(Duration::from_secs(5), 3).fetch(&url).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { ref url, status } if url.ends_with("/book.epub") && status == StatusCode::NOT_FOUND
        ));
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeouts_are_retried_up_to_the_cap() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/book.epub", listener.local_addr().unwrap());
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        // Accept and never answer.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let err = fetcher(Duration::from_millis(200), 2)
            .fetch(&url)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(ref e) if e.is_timeout()));
        assert_eq!(accepted.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/book.epub", listener.local_addr().unwrap());
        drop(listener);

        let err = fetcher(Duration::from_secs(5), 0).fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(ref e) if e.is_connect()));
    }
}
