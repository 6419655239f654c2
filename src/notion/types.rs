use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One run of Notion rich text. Only the plain rendering is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostedFile {
    #[serde(default)]
    pub url: String,
}

/// A `files` entry: either uploaded to Notion (`file`) or linked (`external`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub file: Option<HostedFile>,
    #[serde(default)]
    pub external: Option<HostedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// A typed page property value as returned by the Notion API.
///
/// The `type` tag selects the variant and the payload sits in a sibling key
/// of the same name, e.g. `{"type": "url", "url": "https://..."}`. Types the
/// showcase has no use for decode to [`PropertyValue::Unsupported`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Email {
        #[serde(default)]
        email: Option<String>,
    },
    PhoneNumber {
        #[serde(default)]
        phone_number: Option<String>,
    },
    Number {
        #[serde(default)]
        number: Option<serde_json::Number>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileEntry>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// Decode one property, degrading to `Unsupported` on any shape mismatch.
    pub fn from_json(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(PropertyValue::Unsupported)
    }

    pub fn is_title(&self) -> bool {
        matches!(self, PropertyValue::Title { .. })
    }
}

/// A page as it comes off the wire, before property decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// An external content record: page id plus its properties in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRecord {
    pub id: String,
    pub properties: Vec<(String, PropertyValue)>,
}

impl RawRecord {
    pub fn from_page(page: PageObject) -> Self {
        let properties = page
            .properties
            .into_iter()
            .map(|(name, value)| (name, PropertyValue::from_json(value)))
            .collect();
        Self {
            id: page.id,
            properties,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Response body of `POST /v1/databases/{id}/query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Response body of `GET /v1/databases/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseObject {
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One column of a source database schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub kind: String,
}

impl DatabaseObject {
    pub fn plain_title(&self) -> String {
        self.title
            .iter()
            .map(|t| t.plain_text.as_str())
            .collect::<String>()
    }

    pub fn field_schema(&self) -> Vec<FieldSchema> {
        self.properties
            .iter()
            .map(|(name, value)| FieldSchema {
                name: name.clone(),
                kind: value
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            })
            .collect()
    }
}

/// Full schema + row snapshot of one source database.
#[derive(Debug, Clone, Default)]
pub struct SourceDatabase {
    pub title: String,
    pub fields: Vec<FieldSchema>,
    pub rows: Vec<RawRecord>,
}
