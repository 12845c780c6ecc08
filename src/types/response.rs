use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const MIME_JSON: &str = "application/json";

/// Error body returned by the edge itself (never for redirects).
#[derive(Serialize, Deserialize)]
pub struct CommonResponse {
    pub code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The `{ "data": ... }` envelope used by the CMS API.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct DataResponse<T: Serialize + DeserializeOwned> {
    #[serde(default)]
    pub data: Option<T>,
}
