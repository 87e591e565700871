use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Request body of `POST /databases/{id}/query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

/// One page of query results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_cover")]
    pub cover: Option<FileObject>,
    #[serde(default)]
    pub properties: Properties,
}

/// Typed value of a single database column.
///
/// Any type tag not listed here decodes to [`PropertyValue::Unsupported`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    Status {
        #[serde(default)]
        status: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

/// File reference: either hosted by Notion (`file`) or linked (`external`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileUrl {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A cover that cannot be read counts as no cover.
fn lenient_cover<'de, D>(deserializer: D) -> Result<Option<FileObject>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        serde_json::from_value(value)
            .map_err(|err| tracing::debug!(error = %err, "undecodable page cover"))
            .ok()
    }))
}

impl FileObject {
    /// Non-empty URL of a Notion-hosted upload
    pub fn uploaded_url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .map(|f| f.url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// Non-empty URL of an externally linked file
    pub fn external_url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .map(|f| f.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Column name to value map of a page.
///
/// Decoding is lenient per column: a value that does not fit its declared
/// type becomes [`PropertyValue::Unsupported`] instead of failing the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Find the first alias present on the page.
    ///
    /// Each alias is tried as an exact match first, then case-insensitively
    /// (Unicode lowercase), before moving on to the next alias.
    pub fn lookup(&self, aliases: &[&str]) -> Option<&PropertyValue> {
        aliases.iter().find_map(|alias| {
            self.0.get(*alias).or_else(|| {
                let folded = alias.to_lowercase();
                self.0
                    .iter()
                    .find(|(name, _)| name.to_lowercase() == folded)
                    .map(|(_, value)| value)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?
            .unwrap_or_default();

        let properties = raw
            .into_iter()
            .map(|(name, value)| {
                let value = serde_json::from_value(value).unwrap_or_else(|err| {
                    tracing::debug!(property = %name, error = %err, "undecodable property value");
                    PropertyValue::Unsupported
                });
                (name, value)
            })
            .collect();

        Ok(Self(properties))
    }
}
