use crate::error::VsyscError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    Name,
    Declare,
    WriteLine,
    CreateArray,
    AddToArray,
    Remove,
    Import,
    Export,
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    String,
    Array,
    Import,
    Export,
}

impl Keyword {
    pub const RESERVED: [&'static str; 8] = ["nm", "dc", "wl", "ar", "ad", "rm", "im", "ex"];

    /// Keywords are case-insensitive; anything outside the reserved set is `Custom`.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "nm" => Keyword::Name,
            "dc" => Keyword::Declare,
            "wl" => Keyword::WriteLine,
            "ar" => Keyword::CreateArray,
            "ad" => Keyword::AddToArray,
            "rm" => Keyword::Remove,
            "im" => Keyword::Import,
            "ex" => Keyword::Export,
            _ => Keyword::Custom(lower),
        }
    }

    pub fn is_reserved(name: &str) -> bool {
        Self::RESERVED.contains(&name)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Keyword::Name => "nm",
            Keyword::Declare => "dc",
            Keyword::WriteLine => "wl",
            Keyword::CreateArray => "ar",
            Keyword::AddToArray => "ad",
            Keyword::Remove => "rm",
            Keyword::Import => "im",
            Keyword::Export => "ex",
            Keyword::Custom(name) => name,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Keyword::Name | Keyword::Declare | Keyword::WriteLine => Some(Category::String),
            Keyword::CreateArray | Keyword::AddToArray | Keyword::Remove => Some(Category::Array),
            Keyword::Import => Some(Category::Import),
            Keyword::Export => Some(Category::Export),
            Keyword::Custom(_) => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Keyword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One element of an execution's result sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    String { value: String, keyword: Keyword },
    Array { values: Vec<String>, keyword: Keyword },
    Error { error: VsyscError, keyword: Keyword },
}

impl Record {
    pub fn string(value: impl Into<String>, keyword: Keyword) -> Self {
        Record::String { value: value.into(), keyword }
    }

    pub fn error(error: VsyscError, keyword: Keyword) -> Self {
        Record::Error { error, keyword }
    }

    pub fn keyword(&self) -> &Keyword {
        match self {
            Record::String { keyword, .. }
            | Record::Array { keyword, .. }
            | Record::Error { keyword, .. } => keyword,
        }
    }

    /// The result value this record contributes, `None` for errors.
    pub fn value(&self) -> Option<Value> {
        match self {
            Record::String { value, .. } => Some(Value::Text(value.clone())),
            Record::Array { values, .. } => Some(Value::List(values.clone())),
            Record::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Record::Error { .. })
    }

    pub fn is_deferred(&self) -> bool {
        matches!(
            self.keyword(),
            Keyword::Import | Keyword::Export | Keyword::Custom(_)
        )
    }
}

/// Identifier → record mapping that iterates in insertion order.
/// Overwriting an identifier keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Content {
    entries: IndexMap<String, Record>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: String, record: Record) {
        self.entries.insert(identifier, record);
    }

    pub fn get(&self, identifier: &str) -> Option<&Record> {
        self.entries.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Record> {
        self.entries.get_mut(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Record> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_error(&self) -> Option<&VsyscError> {
        self.entries.values().find_map(|record| match record {
            Record::Error { error, .. } => Some(error),
            _ => None,
        })
    }

    /// Plain string and array values in order, skipping deferred commands.
    pub fn values(&self) -> Vec<Value> {
        self.entries
            .values()
            .filter(|record| !record.is_deferred())
            .filter_map(Record::value)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub name: String,
    pub content: Content,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }
}
