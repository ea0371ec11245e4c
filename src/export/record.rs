// Flattening of an Order into one CSV row.
use crate::esi::types::Order;

pub const HEADER: [&str; 12] = [
    "duration",
    "is_buy_order",
    "issued",
    "location_id",
    "min_volume",
    "order_id",
    "price",
    "range",
    "system_id",
    "type_id",
    "volume_remain",
    "volume_total",
];

impl Order {
    /// One text field per `HEADER` column, same order.
    ///
    /// `price` uses the `f64` `Display` impl: shortest string that parses back
    /// to the same value, never in exponent form.
    pub fn record(&self) -> [String; 12] {
        [
            self.duration.to_string(),
            self.is_buy_order.to_string(),
            self.issued.clone(),
            self.location_id.to_string(),
            self.min_volume.to_string(),
            self.order_id.to_string(),
            self.price.to_string(),
            self.range.clone(),
            self.system_id.to_string(),
            self.type_id.to_string(),
            self.volume_remain.to_string(),
            self.volume_total.to_string(),
        ]
    }
}
