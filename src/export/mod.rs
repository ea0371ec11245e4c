//! Sequential region → page → order export into a CSV sink.
//!
//! Every failure stops the run. The error carries how many rows (header
//! included) had been handed to the CSV writer before it, so callers can tell
//! how much of the file is usable. A failed final flush reports the same
//! count; nothing is rolled back.

pub mod record;

pub use record::HEADER;

use std::io;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::esi::{fetch_orders, list_regions, page_count, Endpoint, EsiError, Transport};

#[derive(Debug, Error)]
#[error("export stopped after {written} rows")]
pub struct ExportError {
    pub written: usize,
    #[source]
    pub source: EsiError,
}

impl ExportError {
    fn at(written: usize) -> impl FnOnce(EsiError) -> ExportError {
        move |source| ExportError { written, source }
    }
}

/// Write the header, then one row per order of every page of every region.
/// Returns the number of rows written, header included.
#[instrument(skip_all)]
pub async fn export_orders<T, W>(
    cancel: &CancellationToken,
    transport: &T,
    endpoint: &Endpoint,
    sink: W,
) -> Result<usize, ExportError>
where
    T: Transport + ?Sized,
    W: io::Write,
{
    let mut writer = csv::Writer::from_writer(sink);
    let mut written = 0usize;

    writer
        .write_record(HEADER)
        .map_err(|e| ExportError::at(written)(e.into()))?;
    written += 1;

    let regions = list_regions(cancel, transport, endpoint)
        .await
        .map_err(ExportError::at(written))?;
    info!(regions = regions.len(), "Exporting market orders");

    let mut pages_fetched = 0u64;
    for region in regions {
        let pages = page_count(cancel, transport, endpoint, region)
            .await
            .map_err(ExportError::at(written))?;
        info!(%region, pages, "Fetching region");

        for page in 1..=pages {
            let orders = fetch_orders(cancel, transport, endpoint, region, page)
                .await
                .map_err(ExportError::at(written))?;
            debug!(%region, page, orders = orders.len(), "Writing page");
            pages_fetched += 1;

            for order in &orders {
                writer
                    .write_record(&order.record())
                    .map_err(|e| ExportError::at(written)(e.into()))?;
                written += 1;
                metrics::counter!("esi_export_rows_total").increment(1);
            }
        }
    }

    writer
        .flush()
        .map_err(|e| ExportError::at(written)(csv::Error::from(e).into()))?;
    info!(rows = written, pages = pages_fetched, "Export complete");
    Ok(written)
}
