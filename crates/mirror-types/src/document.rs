//! Schemaless documents

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity field of users and posts
pub const ID: &str = "id";
/// Post field referencing `User.id`
pub const USER_ID: &str = "userId";
/// Comment field referencing `Post.id`
pub const POST_ID: &str = "postId";

/// A JSON object with no fixed schema.
///
/// Only the key fields (`id`, `userId`, `postId`) carry meaning for the
/// service; everything else is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// `id` as an integer, if present and integral
    pub fn id(&self) -> Option<i64> {
        self.int_field(ID)
    }

    /// `userId` as an integer, if present and integral
    pub fn user_id(&self) -> Option<i64> {
        self.int_field(USER_ID)
    }

    /// `postId` as an integer, if present and integral
    pub fn post_id(&self) -> Option<i64> {
        self.int_field(POST_ID)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Integral floats (`3.0`) count as integers
    fn int_field(&self, field: &str) -> Option<i64> {
        let value = self.0.get(field)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        })
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

impl TryFrom<Value> for Document {
    type Error = Value;

    /// Fails with the original value when it is not an object
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
