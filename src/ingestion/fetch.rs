use super::types::Record;
use crate::error::{Error, Result};

/// Downloads the daily per-state series and decodes it into records.
pub async fn fetch_daily(url: &str) -> Result<Vec<Record>> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::store(status.as_u16(), body));
    }

    let records: Vec<Record> = response.json().await?;
    tracing::info!("Fetched {} records from {}", records.len(), url);
    Ok(records)
}
