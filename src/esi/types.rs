// Source: https://esi.evetech.net/ui/#/Market (GET /markets/{region_id}/orders/)
use serde::{Deserialize, Serialize};
use std::fmt;

// Opaque market region id, e.g. 10000002 (The Forge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub i64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// One market order snapshot, as listed by ESI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub duration: i32,      // days
    pub is_buy_order: bool,
    pub issued: String,     // RFC 3339 timestamp, kept verbatim
    pub location_id: i64,   // station or structure
    pub min_volume: i32,
    pub order_id: i64,
    pub price: f64,
    pub range: String,      // "region", "station", "solarsystem" or a jump count
    pub system_id: i64,
    pub type_id: i32,
    pub volume_remain: i32,
    pub volume_total: i32,
}
