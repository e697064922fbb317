//! ORM-backed records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Value};
use std::any::TypeId;
use std::fmt;

/// A persisted record with named, ordered fields.
pub trait Record: Send + Sync + 'static {
    /// Model name used in type-mismatch messages.
    const NAME: &'static str;

    /// Declared fields, in declaration order.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;
}

/// The value of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    DateTime(DateTime<Utc>),
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl FieldValue {
    /// JSON form of the field. Date/time values become ISO-8601 strings.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Json(v) => v.clone(),
            FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            FieldValue::NaiveDateTime(dt) => {
                Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Time(t) => Value::String(t.format("%H:%M:%S%.f").to_string()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Json(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::NaiveDateTime(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(v: NaiveTime) -> Self {
        FieldValue::Time(v)
    }
}

macro_rules! field_value_from_json {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Json(Value::from(v))
            }
        })*
    };
}

field_value_from_json!(String, &str, bool, i32, i64, u32, u64, f64);

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Json(Value::Null))
    }
}

/// Runtime descriptor of a [`Record`] type.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecordType {
    name: &'static str,
    type_id: TypeId,
}

impl RecordType {
    pub fn of<T: Record>() -> Self {
        Self {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

/// A record instance with its fields captured.
#[derive(Debug, Clone)]
pub struct RecordValue {
    kind: RecordType,
    fields: Vec<(&'static str, FieldValue)>,
}

impl RecordValue {
    pub fn new<T: Record>(record: &T) -> Self {
        Self {
            kind: RecordType::of::<T>(),
            fields: record.fields(),
        }
    }

    pub fn kind(&self) -> RecordType {
        self.kind
    }

    /// Field mapping built from the declared fields.
    pub fn to_fields(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    struct Event {
        id: i64,
        at: DateTime<Utc>,
        day: NaiveDate,
        note: Option<String>,
    }

    impl Record for Event {
        const NAME: &'static str = "Event";

        fn fields(&self) -> Vec<(&'static str, FieldValue)> {
            vec![
                ("id", self.id.into()),
                ("at", self.at.into()),
                ("day", self.day.into()),
                ("note", self.note.clone().into()),
            ]
        }
    }

    #[test]
    fn test_fields_render_iso8601() {
        let event = Event {
            id: 7,
            at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            day: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            note: None,
        };

        assert_eq!(
            RecordValue::new(&event).to_fields(),
            json!({
                "id": 7,
                "at": "2024-03-01T12:30:00+00:00",
                "day": "2024-03-01",
                "note": null,
            })
        );
    }

    #[test]
    fn test_naive_values_use_t_separator() {
        let dt = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();

        assert_eq!(FieldValue::from(dt).to_json(), json!("2023-12-31T23:59:01"));
        assert_eq!(FieldValue::from(dt.time()).to_json(), json!("23:59:01"));
    }
}
