//! Upstream search API contract.
//!
//! The search endpoint answers `{"drinks": [...]}` or `{"drinks": null}` when
//! nothing matches. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Body of a search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchResponse {
    #[serde(default)]
    pub drinks: Option<Vec<Drink>>,
}

/// One drink record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Drink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strDrinkThumb", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl SearchResponse {
    /// Drinks in response order; empty when the API reported no matches.
    pub fn into_drinks(self) -> Vec<Drink> {
        self.drinks.unwrap_or_default()
    }
}
