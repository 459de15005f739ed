use serde::{Deserialize, Serialize};

/// A physical outlet as persisted in the store. Rows are created at seed
/// time and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletRecord {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    /// Comma-separated service tags, e.g. `"coffee,food,wifi"`.
    pub services: String,
    pub hours: String,
    pub parking_available: bool,
    pub wifi_available: bool,
}

/// The fixed four-column projection compiled outlet queries return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletSummary {
    pub name: String,
    pub address: String,
    pub hours: String,
    pub services: String,
}
