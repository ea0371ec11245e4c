//! HTTP seam for the ESI fetchers.
//!
//! The fetchers only see [`Transport`], so the production `reqwest` client, the
//! latency-recording decorator and the in-crate test double are interchangeable.

use async_trait::async_trait;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode, Url};
use std::fmt;
use std::time::Instant;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
}

impl ApiRequest {
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url }
    }

    pub fn head(url: Url) -> Self {
        Self { method: Method::HEAD, url }
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> reqwest::Result<ApiResponse>;
}

/// Production transport backed by a shared `reqwest::Client`.
///
/// No request timeout is configured: the caller's cancellation token is the
/// only deadline.
#[derive(Debug, Clone)]
pub struct EsiClient {
    client: Client,
}

impl EsiClient {
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(user_agent).gzip(true).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for EsiClient {
    async fn send(&self, request: ApiRequest) -> reqwest::Result<ApiResponse> {
        let response = self.client.request(request.method, request.url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, headers, body })
    }
}

/// Decorator recording the wall time of every request into a histogram
/// (microseconds).
pub struct LatencyRecorder<T> {
    inner: T,
    histogram: Mutex<Histogram<u64>>,
}

impl<T> LatencyRecorder<T> {
    pub fn new(inner: T) -> Result<Self, hdrhistogram::CreationError> {
        Ok(Self {
            inner,
            histogram: Mutex::new(Histogram::new(3)?),
        })
    }

    pub fn summary(&self) -> LatencySummary {
        let h = self.histogram.lock();
        LatencySummary {
            requests: h.len(),
            p50_us: h.value_at_quantile(0.50),
            p90_us: h.value_at_quantile(0.90),
            p99_us: h.value_at_quantile(0.99),
            max_us: h.max(),
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for LatencyRecorder<T> {
    async fn send(&self, request: ApiRequest) -> reqwest::Result<ApiResponse> {
        let start = Instant::now();
        let result = self.inner.send(request).await;
        let elapsed = start.elapsed();

        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        if let Err(e) = self.histogram.lock().record(micros) {
            warn!(micros, error = %e, "Failed to record request latency");
        }
        metrics::histogram!("esi_request_seconds").record(elapsed.as_secs_f64());
        trace!(micros, "Request completed");
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub requests: u64,
    pub p50_us: u64,
    pub p90_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |us: u64| us as f64 / 1000.0;
        write!(
            f,
            "requests: {} | p50 {:.3}ms | p90 {:.3}ms | p99 {:.3}ms | max {:.3}ms",
            self.requests,
            ms(self.p50_us),
            ms(self.p90_us),
            ms(self.p99_us),
            ms(self.max_us)
        )
    }
}
