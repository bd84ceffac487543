// src/fetch/client.rs
use crate::utils::error::FetchError;
use reqwest::header;
use std::time::Duration;

/// The page the statistics are published on.
pub const DEFAULT_URL: &str = "https://www.dedrone.com/drone-violations-database";
/// Requests taking longer than this fail the run outright.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("drone_stats/", env!("CARGO_PKG_VERSION"));

/// Creates a reqwest client with the fixed user agent and request timeout.
fn build_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Downloads the page body. Any non-2xx status is an error; nothing is retried.
pub async fn fetch_page(url: &str, timeout_secs: u64) -> Result<String, FetchError> {
    let client = build_client(timeout_secs)?;

    tracing::info!("Downloading page from: {}", url);
    tracing::debug!("Using User-Agent: {} (timeout {}s)", USER_AGENT, timeout_secs);

    let response = client.get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await
        .map_err(|e| classify(e, timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!("Received 403 Forbidden - the site may be rejecting the User-Agent.");
            return Err(FetchError::Blocked);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        return Err(FetchError::Http(status));
    }

    let body = response.text().await.map_err(|e| classify(e, timeout_secs))?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}

fn classify(err: reqwest::Error, timeout_secs: u64) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout_secs)
    } else {
        FetchError::Network(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_unreachable_host_is_a_network_error() {
        // Port 1 on loopback is never listening in CI.
        let result = tokio_test::block_on(fetch_page("http://127.0.0.1:1/", 5));
        assert!(matches!(result, Err(FetchError::Network(_))), "got {:?}", result);
    }

    #[test]
    fn test_unsupported_scheme_fails_before_sending() {
        let result = tokio_test::block_on(fetch_page("ftp://example.com/page", 5));
        assert!(result.is_err());
    }

    /// Serves one connection with a canned response and returns the page URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/drone-violations-database", addr)
    }

    fn status_only(status_line: &str) -> String {
        format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line)
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n<p>1,000</p>".to_string()).await;
        let body = fetch_page(&url, 5).await.unwrap();
        assert_eq!(body, "<p>1,000</p>");
    }

    #[tokio::test]
    async fn test_forbidden_is_blocked() {
        let url = serve_once(status_only("403 Forbidden")).await;
        let result = fetch_page(&url, 5).await;
        assert!(matches!(result, Err(FetchError::Blocked)), "got {:?}", result);
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found_with_url() {
        let url = serve_once(status_only("404 Not Found")).await;
        match fetch_page(&url, 5).await {
            Err(FetchError::NotFound(missing)) => assert_eq!(missing, url),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let url = serve_once(status_only("500 Internal Server Error")).await;
        let result = fetch_page(&url, 5).await;
        assert!(
            matches!(result, Err(FetchError::Http(s)) if s == reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            "got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                drop(socket);
            }
        });

        let result = fetch_page(&format!("http://{}/", addr), 1).await;
        assert!(matches!(result, Err(FetchError::Timeout(1))), "got {:?}", result);
    }

    #[test]
    fn test_user_agent_carries_crate_version() {
        assert!(USER_AGENT.starts_with("drone_stats/"));
        assert!(build_client(DEFAULT_TIMEOUT_SECS).is_ok());
    }
}
