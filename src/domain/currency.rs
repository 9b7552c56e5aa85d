use serde::{Deserialize, Serialize};

/// Canonical orb name as used by the exchange API (e.g. "chaos", "divine").
pub type CurrencyCode = String;

/// An unordered currency pair, stored in lexical order so that
/// `PairKey::new("divine", "chaos") == PairKey::new("chaos", "divine")`.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PairKey {
    pub first: CurrencyCode,
    pub second: CurrencyCode,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    /// Render in the API's `market_id` form, e.g. "chaos|divine".
    pub fn market_id(&self) -> String {
        format!("{}|{}", self.first, self.second)
    }

    /// The pair member that isn't `currency`, if `currency` is a member at all.
    pub fn other(&self, currency: &str) -> Option<&str> {
        if self.first == currency {
            Some(&self.second)
        } else if self.second == currency {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// An ordered pair used as the key into the directed price-range table.
/// Each processed record contributes both (a, b) and (b, a).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct DirectedPair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl DirectedPair {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Split a raw `market_id` ("a|b") into its two currency codes.
/// Returns None for anything that isn't exactly two non-empty codes.
pub fn split_market_id(market_id: &str) -> Option<(&str, &str)> {
    let (a, b) = market_id.split_once('|')?;
    if a.is_empty() || b.is_empty() || b.contains('|') {
        return None;
    }
    Some((a, b))
}

/// Which game realm the digests come from. Determines the base reference
/// currency: chaos for PoE1, exalted for PoE2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Realm {
    #[default]
    Poe1,
    Poe2,
}

impl Realm {
    /// Path segment for the API URL; PoE1 PC has no realm segment.
    pub fn api_segment(&self) -> Option<&'static str> {
        match self {
            Realm::Poe1 => None,
            Realm::Poe2 => Some("poe2"),
        }
    }

    pub fn base_currency(&self) -> &'static str {
        match self {
            Realm::Poe1 => "chaos",
            Realm::Poe2 => "exalted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(PairKey::new("divine", "chaos"), PairKey::new("chaos", "divine"));
        assert_eq!(PairKey::new("chaos", "divine").market_id(), "chaos|divine");
    }

    #[test]
    fn market_id_splitting() {
        assert_eq!(split_market_id("chaos|divine"), Some(("chaos", "divine")));
        assert_eq!(split_market_id("chaos"), None);
        assert_eq!(split_market_id("|divine"), None);
        assert_eq!(split_market_id("a|b|c"), None);
    }

    #[test]
    fn pair_key_other_member() {
        let pair = PairKey::new("chaos", "divine");
        assert_eq!(pair.other("chaos"), Some("divine"));
        assert_eq!(pair.other("divine"), Some("chaos"));
        assert_eq!(pair.other("exalted"), None);
    }
}
