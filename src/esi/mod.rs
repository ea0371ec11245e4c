// ESI (EVE Swagger Interface) market endpoints
pub mod endpoints;  // region list, page count, order pages
pub mod error;
pub mod transport;  // HTTP seam + reqwest client + latency decorator
pub mod types;      // wire types decoded from ESI

#[cfg(test)]
pub(crate) mod fake;

pub use endpoints::{fetch_orders, list_regions, page_count};
pub use error::{ErrorKind, EsiError, EsiResult, InvalidEndpoint};
pub use transport::{ApiRequest, ApiResponse, EsiClient, LatencyRecorder, LatencySummary, Transport};
pub use types::{Order, RegionId};

use reqwest::Url;

pub const DEFAULT_BASE_URL: &str = "https://esi.evetech.net";

/// Response header carrying the total number of pages for a paginated listing.
pub const PAGES_HEADER: &str = "x-pages";

/// Base URL of an ESI deployment. Paths are appended to whatever path the base
/// already carries, so a proxy mounted under a prefix works too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(base: &str) -> Result<Self, InvalidEndpoint> {
        let url = Url::parse(base).map_err(|e| InvalidEndpoint {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(InvalidEndpoint {
                url: base.to_string(),
                reason: "expected an http(s) base url".to_string(),
            });
        }
        Ok(Self { base: url })
    }

    pub fn regions(&self) -> Url {
        self.join("/v1/universe/regions")
    }

    pub fn orders(&self, region: RegionId) -> Url {
        self.join(&format!("/v1/markets/{region}/orders"))
    }

    pub fn orders_page(&self, region: RegionId, page: u32) -> Url {
        let mut url = self.orders(region);
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }

    fn join(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{path}"));
        url.set_query(None);
        url
    }
}
