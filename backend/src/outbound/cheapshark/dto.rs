//! Wire-level DTOs for the CheapShark API.
//!
//! CheapShark reports every numeric field as a string; decoding tolerates
//! missing or garbage values rather than failing the whole payload.

use serde::Deserialize;

use crate::domain::ports::{DealRecord, StoreRecord};

/// One deal as served by `GET /deals`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealDto {
    #[serde(rename = "gameID", default)]
    pub game_id: Option<String>,
    #[serde(rename = "dealID", default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub sale_price: Option<String>,
    #[serde(default)]
    pub normal_price: Option<String>,
    #[serde(default)]
    pub savings: Option<String>,
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

impl DealDto {
    /// Convert to the port record, defaulting missing identity fields the
    /// same way the original service did.
    pub fn into_record(self) -> DealRecord {
        DealRecord {
            game_id: self.game_id.unwrap_or_default(),
            deal_id: self.deal_id.unwrap_or_default(),
            title: self.title.unwrap_or_else(|| "Unknown".to_owned()),
            thumb: self.thumb.filter(|url| !url.is_empty()),
            store_id: self.store_id.unwrap_or_else(|| "0".to_owned()),
            sale_price: parse_price(self.sale_price.as_deref()),
            normal_price: parse_price(self.normal_price.as_deref()),
            savings: parse_price(self.savings.as_deref()),
        }
    }
}

/// One storefront as served by `GET /stores`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDto {
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
}

impl StoreDto {
    /// Convert to the port record, dropping rows without id or name.
    pub fn into_record(self) -> Option<StoreRecord> {
        let id = self.store_id.filter(|id| !id.is_empty())?;
        let name = self.store_name.filter(|name| !name.is_empty())?;
        Some(StoreRecord { id, name })
    }
}
