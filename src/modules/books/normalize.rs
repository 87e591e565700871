//! Mapping from a Notion page onto a [`Book`].
//!
//! Databases name their columns differently, so every field is looked up
//! through an ordered alias list and coerced according to the property's
//! type, not its name. Nothing here fails: unusable values fall back to the
//! field default.

use shelf_notion::{Page, PropertyValue, RichText};

use super::models::Book;

const TITLE: &[&str] = &["Title", "Name"];
const AUTHOR: &[&str] = &["Author", "Authors", "Writer"];
const KIND: &[&str] = &["Type", "Genre", "Category"];
const AGE_RANGE: &[&str] = &["Age group", "Age range", "ageRange", "Age"];
const DESCRIPTION: &[&str] = &["Description", "Blurb", "Summary"];
const IMAGE: &[&str] = &["Image", "Cover", "Photo"];
const COPIES: &[&str] = &["Copies", "Copies count", "Stock"];
const RENTED: &[&str] = &["Rented", "Rented count", "Is rented"];
const MRP: &[&str] = &["MRP", "Price"];
const RENT: &[&str] = &["Rent", "Rent price", "Rental price"];

const DEFAULT_COPIES: u32 = 1;

/// Normalize one page.
pub fn normalize_page(page: &Page) -> Book {
    let props = &page.properties;
    let rented = props.lookup(RENTED);

    Book {
        id: page.id.clone(),
        title: text(props.lookup(TITLE)),
        author: text(props.lookup(AUTHOR)),
        kind: text(props.lookup(KIND)),
        age_range: text(props.lookup(AGE_RANGE)),
        description: text(props.lookup(DESCRIPTION)),
        image: image(props.lookup(IMAGE))
            .or_else(|| cover(page))
            .unwrap_or_default(),
        copies: copies(props.lookup(COPIES)),
        rented: rented_flag(rented),
        rented_count: rented_count(rented),
        mrp: amount(props.lookup(MRP)),
        rent: amount(props.lookup(RENT)),
    }
}

/// Text rendering of a property.
fn text(value: Option<&PropertyValue>) -> String {
    match value {
        Some(PropertyValue::Title { title: segments })
        | Some(PropertyValue::RichText {
            rich_text: segments,
        }) => concat(segments),
        Some(PropertyValue::Select { select: option })
        | Some(PropertyValue::Status { status: option }) => option
            .as_ref()
            .map(|o| o.name.trim().to_string())
            .unwrap_or_default(),
        Some(PropertyValue::MultiSelect { multi_select }) => multi_select
            .iter()
            .map(|o| o.name.trim())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(PropertyValue::Url { url }) => url.as_deref().unwrap_or_default().trim().to_string(),
        Some(PropertyValue::Number { number: Some(n) }) if n.is_finite() => n.to_string(),
        _ => String::new(),
    }
}

fn concat(segments: &[RichText]) -> String {
    segments
        .iter()
        .map(|s| s.plain_text.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Finite value of a number property
fn number(value: Option<&PropertyValue>) -> Option<f64> {
    match value {
        Some(PropertyValue::Number { number: Some(n) }) if n.is_finite() => Some(*n),
        _ => None,
    }
}

fn copies(value: Option<&PropertyValue>) -> u32 {
    number(value)
        .filter(|n| *n >= 1.0)
        .map(|n| n.trunc() as u32)
        .unwrap_or(DEFAULT_COPIES)
}

fn amount(value: Option<&PropertyValue>) -> f64 {
    number(value).filter(|n| *n >= 0.0).unwrap_or(0.0)
}

/// A checkbox counts when ticked; a number counts when non-zero.
fn rented_flag(value: Option<&PropertyValue>) -> bool {
    match value {
        Some(PropertyValue::Checkbox { checkbox }) => *checkbox,
        Some(PropertyValue::Number { number: Some(n) }) => *n != 0.0 && !n.is_nan(),
        _ => false,
    }
}

fn rented_count(value: Option<&PropertyValue>) -> u32 {
    match value {
        Some(PropertyValue::Checkbox { checkbox }) => u32::from(*checkbox),
        other => number(other)
            .filter(|n| *n > 0.0)
            .map(|n| n.trunc() as u32)
            .unwrap_or(0),
    }
}

/// Uploaded file first, then external link, from the image column
fn image(value: Option<&PropertyValue>) -> Option<String> {
    match value {
        Some(PropertyValue::Files { files }) => files
            .iter()
            .find_map(|f| f.uploaded_url())
            .or_else(|| files.iter().find_map(|f| f.external_url()))
            .map(str::to_string),
        Some(PropertyValue::Url { url }) => url.clone().filter(|u| !u.is_empty()),
        _ => None,
    }
}

/// Page cover: external link first, then uploaded file
fn cover(page: &Page) -> Option<String> {
    let cover = page.cover.as_ref()?;
    cover
        .external_url()
        .or_else(|| cover.uploaded_url())
        .map(str::to_string)
}
