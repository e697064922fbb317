//! Handler return values.

use serde_json::Value;
use std::fmt;

use crate::model::cursor::Cursor;
use crate::model::record::{Record, RecordValue};
use crate::model::schema::{Schema, SchemaValue};

/// What a handler actually returned.
///
/// The serializer pairs this with the handler's declared [`Returns`](crate::Returns)
/// to decide how the JSON body is produced.
pub enum Reply {
    /// Any JSON value, including a plain field mapping.
    Json(Value),
    /// An existing validation-model instance.
    Schema(SchemaValue),
    /// A single record.
    Record(RecordValue),
    /// A materialized collection.
    List(Vec<Reply>),
    /// A query cursor, materialized during serialization.
    Cursor(Box<dyn Cursor>),
}

impl Reply {
    pub fn json(value: impl Into<Value>) -> Self {
        Reply::Json(value.into())
    }

    pub fn schema<T: Schema>(instance: &T) -> Self {
        Reply::Schema(SchemaValue::new(instance))
    }

    pub fn record<T: Record>(record: &T) -> Self {
        Reply::Record(RecordValue::new(record))
    }

    pub fn schemas<'a, T: Schema>(items: impl IntoIterator<Item = &'a T>) -> Self {
        Reply::List(items.into_iter().map(Reply::schema).collect())
    }

    pub fn records<'a, T: Record>(items: impl IntoIterator<Item = &'a T>) -> Self {
        Reply::List(items.into_iter().map(Reply::record).collect())
    }

    pub fn cursor(cursor: impl Cursor + 'static) -> Self {
        Reply::Cursor(Box::new(cursor))
    }

    /// Short description used in type-mismatch messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Reply::Json(Value::Object(_)) => "a JSON object".to_string(),
            Reply::Json(Value::Array(_)) => "a JSON array".to_string(),
            Reply::Json(_) => "a JSON scalar".to_string(),
            Reply::Schema(s) => format!("a {} instance", s.name()),
            Reply::Record(r) => format!("a {} record", r.kind().name()),
            Reply::List(_) => "a list".to_string(),
            Reply::Cursor(c) => format!("a {} cursor", c.record_type().name()),
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Vec<Reply>> for Reply {
    fn from(items: Vec<Reply>) -> Self {
        Reply::List(items)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Reply::Schema(s) => f.debug_tuple("Schema").field(s).finish(),
            Reply::Record(r) => f.debug_tuple("Record").field(r).finish(),
            Reply::List(items) => f.debug_tuple("List").field(items).finish(),
            Reply::Cursor(c) => f.debug_tuple("Cursor").field(&c.record_type()).finish(),
        }
    }
}
