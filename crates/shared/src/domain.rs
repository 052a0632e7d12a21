use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Identifier exactly as the user typed it.
///
/// The value is never trimmed or rewritten; transport encoding happens when a
/// request target is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A number as the service sent it.
///
/// The text is kept exactly as received so it can be shown without
/// reformatting (`"59.90"` stays `59.90`). JSON numbers are accepted too and
/// keep their shortest form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NumericText(String);

impl NumericText {
    pub fn parse(text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && !text.trim().is_empty() => Ok(Self(text)),
            _ => Err(format!("invalid numeric string {text:?}")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NumericText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Items flattened out of DynamoDB carry numbers as strings ("N": "59.90").
impl<'de> Deserialize<'de> for NumericText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Unsigned(u64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Integer(value) => Ok(Self(value.to_string())),
            Raw::Unsigned(value) => Ok(Self(value.to_string())),
            Raw::Float(value) => Ok(Self(value.to_string())),
            Raw::Text(text) => Self::parse(text).map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub style: String,
    pub price: NumericText,
    pub current_stock: NumericText,
    pub gender_affinity: String,
    pub where_visible: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Image URL when the backend supplied a usable one.
    pub fn visible_image_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}
