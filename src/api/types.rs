use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    /// `"all"` or a positive count.
    pub return_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteIndexResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteDocResponse {
    pub doc_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
