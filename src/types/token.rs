//! Token types

use serde::{Deserialize, Serialize};
use crate::config::{DEFAULT_TOKEN_DECIMALS, TOKEN_REFERENCE_BASE_URL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub original_symbol: String,
    pub decimals: u32,
    pub icon_url: String,
    pub url: String,
}

/// Token details as reported by the token-detail provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetail {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub original_symbol: String,
    pub token_decimals: u32,
    #[serde(default)]
    pub url_icon: Option<String>,
}

impl Token {
    pub fn from_detail(id: &str, detail: TokenDetail) -> Self {
        let url = format!("{}{}", TOKEN_REFERENCE_BASE_URL, detail.name.replace(' ', "-"));
        Self {
            id: id.to_string(),
            name: detail.name,
            symbol: detail.symbol,
            original_symbol: detail.original_symbol,
            decimals: detail.token_decimals,
            icon_url: detail.url_icon.unwrap_or_default(),
            url,
        }
    }

    /// Placeholder substituted when details for `id` cannot be retrieved.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown".to_string(),
            symbol: "UNKNOWN".to_string(),
            original_symbol: "UNKNOWN".to_string(),
            decimals: DEFAULT_TOKEN_DECIMALS,
            icon_url: String::new(),
            url: String::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.symbol == "UNKNOWN" && self.url.is_empty()
    }
}
