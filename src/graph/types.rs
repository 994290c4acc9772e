//! Records decoded from collection pages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::str::FromStr;

/// Anything with a stable remote identity.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A page (or any entity the API returns in a `likes` edge).
///
/// Every field besides `id` is kept verbatim in `attributes` and flattened
/// back on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    #[serde(default = "default_counter")]
    pub counter: u64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

fn default_counter() -> u64 {
    1
}

impl PageRecord {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            counter: 1,
            attributes: Map::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    pub fn category(&self) -> Option<&str> {
        self.attributes.get("category").and_then(Value::as_str)
    }
}

impl Identified for PageRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A post in a page's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    #[serde(deserialize_with = "deserialize_graph_time")]
    pub created_time: DateTime<Utc>,
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

impl Identified for PostRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileType {
    User,
    Page,
    #[default]
    Other,
}

impl From<&str> for ProfileType {
    fn from(s: &str) -> Self {
        match s {
            "user" => ProfileType::User,
            "page" => ProfileType::Page,
            _ => ProfileType::Other,
        }
    }
}

/// Unknown subtypes parse as [`ProfileType::Other`], so parsing never fails.
impl FromStr for ProfileType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProfileType::from(s))
    }
}

impl<'de> Deserialize<'de> for ProfileType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(ProfileType::from).unwrap_or_default())
    }
}

/// One entry of a `likes` edge. Only used to filter, never retained.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    #[serde(rename = "profile_type", default)]
    pub subtype: ProfileType,
}

impl EdgeRecord {
    pub fn is_user(&self) -> bool {
        self.subtype == ProfileType::User
    }
}

impl Identified for EdgeRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Parse `created_time` as the Graph API writes it (`2017-09-05T10:00:00+0000`),
/// falling back to RFC 3339.
pub fn parse_graph_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn deserialize_graph_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_graph_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid created_time `{}`", raw)))
}
