use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers for the upstream APIs a handler can front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    CoinMarketCap,
    DefiLlama,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::CoinMarketCap, Self::DefiLlama];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CoinMarketCap => "coinmarketcap",
            Self::DefiLlama => "defillama",
        }
    }

    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::CoinMarketCap => "https://pro-api.coinmarketcap.com/v1",
            Self::DefiLlama => "https://api.llama.fi",
        }
    }

    /// Whether the upstream rejects calls that carry no credential.
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::CoinMarketCap)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "coinmarketcap" | "cmc" => Ok(Self::CoinMarketCap),
            "defillama" | "llama" => Ok(Self::DefiLlama),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
