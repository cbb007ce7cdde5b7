use std::time::Duration;

use reqwest::StatusCode;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10_000);

const USER_AGENT: &str = concat!("quake-feed/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(error) if error.is_timeout())
    }
}

pub fn build_client(config: &FetcherConfig) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Issues a single GET and returns the body of a `200 OK` response.
///
/// Any other status, an unparsable url, or a transport failure is an error;
/// there are no retries. The response is dropped on every return path, which
/// releases the connection.
pub async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let url = url::Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    tracing::debug!(%url, "requesting earthquake feed");

    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    tracing::debug!(bytes = bytes.len(), "received earthquake feed");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::Router;

    const FEED: &str = r#"{"features":[{"properties":{"mag":6.2,"place":"5km N of Cairo, Egypt","time":1000000000000,"url":"http://x"}}]}"#;

    async fn spawn_test_server() -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/query", get(|| async { FEED }))
            .route(
                "/missing",
                get(|| async { (AxumStatus::NOT_FOUND, "no such feed") }),
            )
            .route(
                "/created",
                get(|| async { (AxumStatus::CREATED, FEED) }),
            )
            .route(
                "/latin1",
                get(|| async { vec![b'{', 0xE9, b'}'] }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    FEED
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}"), join_handle)
    }

    fn client() -> reqwest::Client {
        build_client(&FetcherConfig::default()).expect("client should build")
    }

    #[tokio::test]
    async fn fetch_body_returns_body_on_200() {
        let (base, server_task) = spawn_test_server().await;

        let body = fetch_body(&client(), &format!("{base}/query"))
            .await
            .expect("fetch should succeed");
        assert_eq!(body, FEED);

        server_task.abort();
    }

    #[tokio::test]
    async fn non_200_statuses_are_errors_without_body() {
        let (base, server_task) = spawn_test_server().await;
        let client = client();

        let missing = fetch_body(&client, &format!("{base}/missing")).await;
        assert!(matches!(missing, Err(FetchError::HttpStatus(404))));
        assert!(!missing.expect_err("404 is an error").is_timeout());

        let created = fetch_body(&client, &format!("{base}/created")).await;
        assert!(matches!(created, Err(FetchError::HttpStatus(201))));

        server_task.abort();
    }

    #[tokio::test]
    async fn invalid_url_fails_before_any_request() {
        let result = fetch_body(&client(), "not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn connection_refused_is_a_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        drop(listener);

        let result = fetch_body(&client(), &format!("http://{address}/query")).await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn connect_timeout_reaches_the_client() {
        let config = FetcherConfig {
            connect_timeout: Duration::from_millis(200),
            ..FetcherConfig::default()
        };
        let client = build_client(&config).expect("client should build");

        // 10.255.255.1 is non-routable; the SYN goes unanswered.
        let started = std::time::Instant::now();
        let result = fetch_body(&client, "http://10.255.255.1/query").await;
        assert!(started.elapsed() < Duration::from_secs(5));
        match result {
            Err(FetchError::Request(error)) => assert!(error.is_connect()),
            other => panic!("expected a connect error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let (base, server_task) = spawn_test_server().await;

        let body = fetch_body(&client(), &format!("{base}/latin1"))
            .await
            .expect("fetch should succeed");
        assert_eq!(body, "{\u{FFFD}}");

        server_task.abort();
    }

    #[tokio::test]
    async fn read_timeout_aborts_slow_responses() {
        let (base, server_task) = spawn_test_server().await;
        let config = FetcherConfig {
            read_timeout: Duration::from_millis(200),
            ..FetcherConfig::default()
        };
        let client = build_client(&config).expect("client should build");

        let result = fetch_body(&client, &format!("{base}/slow")).await;
        assert!(matches!(result, Err(FetchError::Request(_))));

        server_task.abort();
    }
}
