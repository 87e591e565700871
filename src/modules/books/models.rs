use serde::{Deserialize, Serialize};

/// A catalog entry as served to the front-end.
///
/// String fields are empty when the source has no value; numeric fields are
/// never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Notion page id
    pub id: String,
    pub title: String,
    pub author: String,
    /// Genre or format
    #[serde(rename = "type")]
    pub kind: String,
    pub age_range: String,
    pub description: String,
    /// Cover image URL
    pub image: String,
    /// Copies owned; at least 1
    pub copies: u32,
    /// Whether any copy is out on loan
    pub rented: bool,
    /// Copies out on loan
    pub rented_count: u32,
    /// Printed price
    pub mrp: f64,
    /// Rental fee
    pub rent: f64,
}
