// In-memory stand-in for ESI, used by the test suites only.
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::esi::transport::{ApiRequest, ApiResponse, Transport};
use crate::esi::types::{Order, RegionId};
use crate::esi::PAGES_HEADER;

/// Request shapes the fake understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Route {
    Regions,
    PageCount(RegionId),
    Orders(RegionId, u32),
    Unmatched,
}

impl Route {
    fn of(request: &ApiRequest) -> Self {
        let segments: Vec<&str> = request.url.path().trim_matches('/').split('/').collect();
        let is_get = request.method == Method::GET;
        let is_head = request.method == Method::HEAD;
        match segments.as_slice() {
            ["v1", "universe", "regions"] if is_get => Route::Regions,
            ["v1", "markets", region, "orders"] => {
                let Ok(region) = region.parse().map(RegionId) else {
                    return Route::Unmatched;
                };
                if is_head {
                    return Route::PageCount(region);
                }
                if !is_get {
                    return Route::Unmatched;
                }
                let page = request
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == "page")
                    .map(|(_, v)| v.parse().ok())
                    .unwrap_or(Some(1));
                match page {
                    Some(page) => Route::Orders(region, page),
                    None => Route::Unmatched,
                }
            }
            _ => Route::Unmatched,
        }
    }
}

pub(crate) struct FakeEsi {
    regions: Vec<RegionId>,
    default_pages: u32,
    pages: HashMap<RegionId, u32>,
    orders: Vec<Order>,
    overrides: HashMap<Route, ApiResponse>,
    cancel_on: Option<(Route, CancellationToken)>,
    seen: Mutex<Vec<Route>>,
}

impl FakeEsi {
    pub const BASE_URL: &'static str = "http://esi.test";

    pub fn new(regions: Vec<i64>, default_pages: u32, orders: Vec<Order>) -> Self {
        Self {
            regions: regions.into_iter().map(RegionId).collect(),
            default_pages,
            pages: HashMap::new(),
            orders,
            overrides: HashMap::new(),
            cancel_on: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Two regions, five pages each, two orders per page.
    pub fn fixture() -> Self {
        Self::new(
            vec![10000002, 10000043],
            5,
            vec![
                Order { order_id: 1, price: 123.45, ..Default::default() },
                Order { order_id: 2, price: 234.56, ..Default::default() },
            ],
        )
    }

    pub fn with_pages(mut self, region: RegionId, pages: u32) -> Self {
        self.pages.insert(region, pages);
        self
    }

    /// Serve a canned response instead of the generated one for `route`.
    pub fn respond(mut self, route: Route, response: ApiResponse) -> Self {
        self.overrides.insert(route, response);
        self
    }

    /// Fire `token` while serving `route`; the response itself still goes out.
    pub fn cancel_on(mut self, route: Route, token: CancellationToken) -> Self {
        self.cancel_on = Some((route, token));
        self
    }

    pub fn seen(&self) -> Vec<Route> {
        self.seen.lock().clone()
    }

    pub fn status(status: StatusCode, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn json(body: Vec<u8>) -> ApiResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        ApiResponse { status: StatusCode::OK, headers, body }
    }

    pub fn with_header(mut response: ApiResponse, name: &'static str, value: &str) -> ApiResponse {
        response.headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(value).expect("valid header value"),
        );
        response
    }

    fn generate(&self, route: Route) -> ApiResponse {
        match route {
            Route::Regions => Self::json(serde_json::to_vec(&self.regions).expect("regions encode")),
            Route::PageCount(region) => {
                let pages = self.pages.get(&region).copied().unwrap_or(self.default_pages);
                Self::with_header(Self::status(StatusCode::OK, ""), PAGES_HEADER, &pages.to_string())
            }
            Route::Orders(_, _) => Self::json(serde_json::to_vec(&self.orders).expect("orders encode")),
            Route::Unmatched => Self::status(StatusCode::NOT_FOUND, "not found"),
        }
    }
}

#[async_trait]
impl Transport for FakeEsi {
    async fn send(&self, request: ApiRequest) -> reqwest::Result<ApiResponse> {
        let route = Route::of(&request);
        self.seen.lock().push(route);

        if let Some((trigger, token)) = &self.cancel_on {
            if *trigger == route {
                token.cancel();
            }
        }

        Ok(match self.overrides.get(&route) {
            Some(response) => response.clone(),
            None => self.generate(route),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn request(method: Method, path: &str) -> ApiRequest {
        let url = Url::parse(&format!("{}{}", FakeEsi::BASE_URL, path)).unwrap();
        ApiRequest { method, url }
    }

    #[test]
    fn test_routes() {
        let r = RegionId(10000002);
        assert_eq!(Route::of(&request(Method::GET, "/v1/universe/regions")), Route::Regions);
        assert_eq!(Route::of(&request(Method::HEAD, "/v1/markets/10000002/orders")), Route::PageCount(r));
        assert_eq!(Route::of(&request(Method::GET, "/v1/markets/10000002/orders?page=4")), Route::Orders(r, 4));
        assert_eq!(Route::of(&request(Method::GET, "/v1/markets/10000002/orders")), Route::Orders(r, 1));
        assert_eq!(Route::of(&request(Method::GET, "/v1/markets/forge/orders")), Route::Unmatched);
        assert_eq!(Route::of(&request(Method::POST, "/v1/universe/regions")), Route::Unmatched);
        assert_eq!(Route::of(&request(Method::GET, "/v2/status")), Route::Unmatched);
    }

    #[tokio::test]
    async fn test_unmatched_is_404() {
        let fake = FakeEsi::fixture();
        let response = fake.send(request(Method::GET, "/v1/status")).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "not found");
    }
}
