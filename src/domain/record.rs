use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::currency::CurrencyCode;

/// One market's completed-trade aggregate for a single clock hour, exactly as
/// delivered by the exchange API. All maps are keyed by the two currencies of
/// `market_id`; a missing key means the API reported nothing for that side.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct HourlyMarketRecord {
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub market_id: String,
    #[serde(default)]
    pub volume_traded: HashMap<CurrencyCode, f64>,
    #[serde(default)]
    pub lowest_stock: HashMap<CurrencyCode, f64>,
    #[serde(default)]
    pub highest_stock: HashMap<CurrencyCode, f64>,
    #[serde(default)]
    pub lowest_ratio: HashMap<CurrencyCode, f64>,
    #[serde(default)]
    pub highest_ratio: HashMap<CurrencyCode, f64>,
}

/// A full hourly digest: every market's aggregate for one hour, one API call.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct HourlyDigest {
    #[serde(default)]
    pub next_change_id: Option<String>,
    #[serde(default)]
    pub markets: Vec<HourlyMarketRecord>,
}

impl HourlyDigest {
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_deserializes_with_missing_fields() {
        // Records with absent maps must still parse; the analyzer decides
        // whether they are usable, not the serde layer.
        let raw = r#"{
            "next_change_id": "abc123",
            "markets": [
                {"league": "Standard", "market_id": "chaos|divine"},
                {"league": "Standard", "market_id": "chaos|alchemy",
                 "lowest_ratio": {"chaos": 1.0, "alchemy": 4.0},
                 "highest_ratio": {"chaos": 1.0, "alchemy": 5.0},
                 "volume_traded": {"chaos": 120.0, "alchemy": 510.0}}
            ]
        }"#;
        let digest: HourlyDigest = serde_json::from_str(raw).unwrap();
        assert_eq!(digest.markets.len(), 2);
        assert!(digest.markets[0].lowest_ratio.is_empty());
        assert_eq!(digest.markets[1].volume_traded["chaos"], 120.0);
    }
}
