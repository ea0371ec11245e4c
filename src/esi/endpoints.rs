use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::esi::error::{EsiError, EsiResult};
use crate::esi::transport::{ApiRequest, ApiResponse, Transport};
use crate::esi::types::{Order, RegionId};
use crate::esi::{Endpoint, PAGES_HEADER};

const REGIONS: &str = "regions";
const PAGES: &str = "pages";
const ORDERS: &str = "orders";

// Send one request, racing it against the token. Anything but 2xx is a failure.
async fn send<T: Transport + ?Sized>(
    cancel: &CancellationToken,
    transport: &T,
    endpoint: &'static str,
    request: ApiRequest,
) -> EsiResult<ApiResponse> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(EsiError::Cancelled { endpoint }),
        response = transport.send(request) => {
            response.map_err(|source| EsiError::Transport { endpoint, source })?
        }
    };

    if !response.status.is_success() {
        return Err(EsiError::Fetch {
            endpoint,
            status: response.status,
            body: response.text(),
        });
    }
    Ok(response)
}

/// GET /v1/universe/regions
#[instrument(level = "debug", skip_all)]
pub async fn list_regions<T: Transport + ?Sized>(
    cancel: &CancellationToken,
    transport: &T,
    endpoint: &Endpoint,
) -> EsiResult<Vec<RegionId>> {
    let response = send(cancel, transport, REGIONS, ApiRequest::get(endpoint.regions())).await?;
    let regions: Vec<RegionId> = serde_json::from_slice(&response.body)
        .map_err(|source| EsiError::Decode { endpoint: REGIONS, source })?;
    debug!(count = regions.len(), "Listed regions");
    Ok(regions)
}

/// HEAD /v1/markets/{region}/orders, reading the `x-pages` header.
#[instrument(level = "debug", skip(cancel, transport, endpoint))]
pub async fn page_count<T: Transport + ?Sized>(
    cancel: &CancellationToken,
    transport: &T,
    endpoint: &Endpoint,
    region: RegionId,
) -> EsiResult<u32> {
    let response = send(cancel, transport, PAGES, ApiRequest::head(endpoint.orders(region))).await?;

    let value = response.headers.get(PAGES_HEADER).ok_or_else(|| EsiError::Parse {
        endpoint: PAGES,
        reason: format!("missing {PAGES_HEADER} header"),
    })?;
    let text = value.to_str().map_err(|_| EsiError::Parse {
        endpoint: PAGES,
        reason: format!("{PAGES_HEADER} header is not text"),
    })?;
    text.trim().parse::<u32>().map_err(|e| EsiError::Parse {
        endpoint: PAGES,
        reason: format!("invalid {PAGES_HEADER} header {text:?}: {e}"),
    })
}

/// GET /v1/markets/{region}/orders?page={page}. Pages are 1-indexed.
#[instrument(level = "debug", skip(cancel, transport, endpoint))]
pub async fn fetch_orders<T: Transport + ?Sized>(
    cancel: &CancellationToken,
    transport: &T,
    endpoint: &Endpoint,
    region: RegionId,
    page: u32,
) -> EsiResult<Vec<Order>> {
    let request = ApiRequest::get(endpoint.orders_page(region, page));
    let response = send(cancel, transport, ORDERS, request).await?;
    let orders: Vec<Order> = serde_json::from_slice(&response.body)
        .map_err(|source| EsiError::Decode { endpoint: ORDERS, source })?;
    debug!(count = orders.len(), "Fetched orders");
    Ok(orders)
}
