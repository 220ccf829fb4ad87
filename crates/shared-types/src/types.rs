use std::collections::BTreeMap;

/// A single value in a submission record: free text or a gating flag.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Text(String),
    Flag(bool),
}

impl RecordValue {
    /// Truthiness used by conditional template blocks.
    pub fn is_truthy(&self) -> bool {
        match self {
            RecordValue::Text(text) => !text.is_empty(),
            RecordValue::Flag(flag) => *flag,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(text) => Some(text),
            RecordValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            RecordValue::Flag(flag) => Some(*flag),
            RecordValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for RecordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordValue::Text(text) => write!(f, "{}", text),
            // Matches how the template language prints booleans
            RecordValue::Flag(true) => write!(f, "True"),
            RecordValue::Flag(false) => write!(f, "False"),
        }
    }
}

impl From<String> for RecordValue {
    fn from(text: String) -> Self {
        RecordValue::Text(text)
    }
}

impl From<&str> for RecordValue {
    fn from(text: &str) -> Self {
        RecordValue::Text(text.to_string())
    }
}

impl From<bool> for RecordValue {
    fn from(flag: bool) -> Self {
        RecordValue::Flag(flag)
    }
}

/// Flat key-value record handed to the document renderer.
///
/// Keys are kept ordered so two records built from the same input
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SubmissionRecord {
    fields: BTreeMap<String, RecordValue>,
}

impl SubmissionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RecordValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn insert_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.fields.insert(key.into(), RecordValue::Text(text.into()));
    }

    pub fn insert_flag(&mut self, key: impl Into<String>, flag: bool) {
        self.fields.insert(key.into(), RecordValue::Flag(flag));
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key)
    }

    /// Text value under `key`, if present and textual
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(RecordValue::as_text)
    }

    /// Flag value under `key`, if present and boolean
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(RecordValue::as_flag)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys from `expected` that this record does not carry, in input order
    pub fn missing_keys<'a, I>(&self, expected: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        expected
            .into_iter()
            .filter(|key| !self.fields.contains_key(*key))
            .map(str::to_string)
            .collect()
    }
}
