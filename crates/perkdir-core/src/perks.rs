//! Perk records as served by the backend's public perk collection.
//!
//! ## Observed shape
//!
//! ### `merchant`
//! Depending on how the backend populated the document, the merchant is
//! either an embedded object (`{"_id": "m1", "name": "Acme"}`, sometimes with
//! `id` instead of `_id`) or a bare string that is the merchant's name or id.
//! Both are kept as a raw [`MerchantRef`] and resolved through
//! [`normalize_merchant`], which is the only place that inspects the shape.
//!
//! ### Malformed records
//! A missing or wrongly typed `title` / `merchant` never fails the payload.
//! The field deserializes to `None` and the record is skipped by the merchant
//! option list and by name matching.
//!
//! ### Everything else
//! Fields we do not model (`description` aside) are kept verbatim in
//! [`PerkRecord::extra`] so callers can render them without a schema change.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Publication status of a perk. The public endpoint only returns
/// [`Visibility::Public`] records; the field is modeled for completeness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Merchant reference exactly as it appeared in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MerchantRef {
    Embedded {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Bare(String),
}

impl MerchantRef {
    pub fn embedded(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Embedded {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    pub fn bare(value: impl Into<String>) -> Self {
        Self::Bare(value.into())
    }

    /// Interprets an arbitrary JSON value as a merchant reference.
    ///
    /// Returns `None` for shapes that cannot identify a merchant (null, arrays,
    /// booleans, objects with neither an id nor a name).
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Bare(s.clone())),
            Value::Number(n) => Some(Self::Bare(n.to_string())),
            Value::Object(map) => {
                let id = map
                    .get("id")
                    .or_else(|| map.get("_id"))
                    .and_then(scalar_to_string);
                let name = map.get("name").and_then(scalar_to_string);
                if id.is_none() && name.is_none() {
                    None
                } else {
                    Some(Self::Embedded { id, name })
                }
            }
            _ => None,
        }
    }
}

/// A merchant resolved to a canonical `{id, name}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
}

impl Merchant {
    /// True when the source carried no id distinct from the name, i.e. the
    /// merchant can only be identified by its name.
    #[must_use]
    pub fn is_name_only(&self) -> bool {
        fold_key(&self.id) == fold_key(&self.name)
    }
}

/// Resolves a raw [`MerchantRef`] into a canonical [`Merchant`].
///
/// - An object with both id and name keeps both.
/// - An object with only one of them uses it as both id and name.
/// - A bare string is used as both id and name.
///
/// Returns `None` when nothing non-blank is left after trimming.
#[must_use]
pub fn normalize_merchant(value: &MerchantRef) -> Option<Merchant> {
    let (id, name) = match value {
        MerchantRef::Bare(raw) => {
            let raw = non_blank(Some(raw.as_str()))?;
            (raw, raw)
        }
        MerchantRef::Embedded { id, name } => {
            match (non_blank(id.as_deref()), non_blank(name.as_deref())) {
                (Some(id), Some(name)) => (id, name),
                (Some(only), None) | (None, Some(only)) => (only, only),
                (None, None) => return None,
            }
        }
    };

    Some(Merchant {
        id: id.to_owned(),
        name: name.to_owned(),
    })
}

/// A single perk from the public perk collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPerkRecord")]
pub struct PerkRecord {
    /// Backend identifier. Taken from `id`, or from Mongo-style `_id` when
    /// `id` is absent.
    pub id: Option<String>,

    pub title: Option<String>,

    pub merchant: Option<MerchantRef>,

    pub visibility: Visibility,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Every field not modeled above, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire form of [`PerkRecord`]. Mongoose documents serialized with virtuals
/// carry both `_id` and `id`, so the two keys are read separately instead of
/// as aliases of one field.
#[derive(Deserialize)]
struct RawPerkRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,

    #[serde(default, rename = "_id", deserialize_with = "lenient_string")]
    mongo_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,

    #[serde(default, deserialize_with = "lenient_merchant")]
    merchant: Option<MerchantRef>,

    #[serde(default, deserialize_with = "lenient_visibility")]
    visibility: Visibility,

    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawPerkRecord> for PerkRecord {
    fn from(raw: RawPerkRecord) -> Self {
        Self {
            id: raw.id.or(raw.mongo_id),
            title: raw.title,
            merchant: raw.merchant,
            visibility: raw.visibility,
            description: raw.description,
            extra: raw.extra,
        }
    }
}

impl PerkRecord {
    /// Builds a public record with the given title and merchant.
    pub fn new(id: impl Into<String>, title: impl Into<String>, merchant: MerchantRef) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            merchant: Some(merchant),
            visibility: Visibility::Public,
            description: None,
            extra: Map::new(),
        }
    }

    /// The display title, or `None` when the record has no usable title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// The canonical merchant, or `None` when the record has no usable merchant.
    #[must_use]
    pub fn merchant(&self) -> Option<Merchant> {
        self.merchant.as_ref().and_then(normalize_merchant)
    }

    /// True when the record carries both a title and a merchant.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.title().is_some() && self.merchant().is_some()
    }
}

/// Case- and whitespace-insensitive comparison key for merchant identity.
pub(crate) fn fold_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

fn lenient_merchant<'de, D>(deserializer: D) -> Result<Option<MerchantRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(MerchantRef::from_value(&value))
}

/// Only an explicit `"private"` marks a record private; anything else
/// (absent, null, unknown strings) is treated as public, which is what the
/// endpoint promises to return.
fn lenient_visibility<'de, D>(deserializer: D) -> Result<Visibility, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if s.trim().eq_ignore_ascii_case("private") => Visibility::Private,
        _ => Visibility::Public,
    })
}

#[cfg(test)]
#[path = "perks_test.rs"]
mod tests;
