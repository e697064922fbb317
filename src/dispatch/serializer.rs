//! Result serialization.
//!
//! # Responsibilities
//! - Convert a handler's [`Reply`] into a JSON body, guided by its declared [`Returns`]
//!
//! # Dispatch (first match wins)
//! 1. Declared list of a model type: every element is encoded as that type
//! 2. A cursor: materialized, elements encoded as the cursor's record type
//! 3. Declared validation model: construct-and-validate, emit its fields
//! 4. Declared record: must be that exact record kind, emit its fields
//! 5. Anything else passes through as-is
//!
//! # Design Decisions
//! - The case is chosen once into a [`Shape`] before any encoding happens
//! - Re-validation against the declared schema is authoritative and may
//!   reject or coerce what the handler returned

use serde_json::Value;

use crate::dispatch::signature::Returns;
use crate::error::{RouteError, RouteResult};
use crate::model::schema::encode_fault;
use crate::model::{ModelType, RecordType, Reply, SchemaInput, SchemaType};

/// The encoding case selected for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Plain,
    Schema(SchemaType),
    Record(RecordType),
    List(ModelType),
    Cursor(RecordType),
}

impl Shape {
    /// Pick the case for `reply` under `returns`.
    pub fn select(returns: &Returns, reply: &Reply) -> Shape {
        match (returns, reply) {
            (Returns::List(element), _) => Shape::List(*element),
            (_, Reply::Cursor(cursor)) => Shape::Cursor(cursor.record_type()),
            (Returns::Schema(schema), _) => Shape::Schema(*schema),
            (Returns::Record(record), _) => Shape::Record(*record),
            _ => Shape::Plain,
        }
    }
}

/// Encode `reply` as JSON according to `returns`.
pub async fn serialize(returns: &Returns, reply: Reply) -> RouteResult<Value> {
    let shape = Shape::select(returns, &reply);
    tracing::trace!(shape = ?shape, "Serializing reply");

    match shape {
        Shape::List(element) => {
            let items = materialize(reply, element.name()).await?;
            items.into_iter().map(|item| encode_model(element, item)).collect()
        }
        Shape::Cursor(record) => {
            let items = materialize(reply, record.name()).await?;
            items
                .into_iter()
                .map(|item| encode_record(record, item))
                .collect()
        }
        Shape::Schema(schema) => encode_schema(schema, reply),
        Shape::Record(record) => encode_record(record, reply),
        Shape::Plain => encode_plain(reply),
    }
}

async fn materialize(reply: Reply, element: &str) -> RouteResult<Vec<Reply>> {
    match reply {
        Reply::List(items) => Ok(items),
        Reply::Json(Value::Array(items)) => Ok(items.into_iter().map(Reply::Json).collect()),
        Reply::Cursor(cursor) => {
            let records = cursor.fetch().await?;
            Ok(records.into_iter().map(Reply::Record).collect())
        }
        other => Err(RouteError::type_mismatch(format!(
            "expected a list of {element}, got {}",
            other.describe()
        ))),
    }
}

fn encode_model(element: ModelType, item: Reply) -> RouteResult<Value> {
    match element {
        ModelType::Schema(schema) => encode_schema(schema, item),
        ModelType::Record(record) => encode_record(record, item),
    }
}

fn encode_schema(schema: SchemaType, reply: Reply) -> RouteResult<Value> {
    let input = match reply {
        Reply::Schema(instance) => SchemaInput::Instance(instance),
        Reply::Json(fields @ Value::Object(_)) => SchemaInput::Fields(fields),
        other => {
            return Err(RouteError::type_mismatch(format!(
                "expected {} or a field mapping, got {}",
                schema.name(),
                other.describe()
            )))
        }
    };

    schema.construct(input)
}

fn encode_record(record: RecordType, reply: Reply) -> RouteResult<Value> {
    match reply {
        Reply::Record(value) if value.kind() == record => Ok(value.to_fields()),
        other => Err(RouteError::type_mismatch(format!(
            "expected a {} record, got {}",
            record.name(),
            other.describe()
        ))),
    }
}

fn encode_plain(reply: Reply) -> RouteResult<Value> {
    match reply {
        Reply::Json(value) => Ok(value),
        Reply::Schema(instance) => {
            let name = instance.name();
            instance.into_fields().map_err(|e| encode_fault(name, e))
        }
        Reply::Record(value) => Ok(value.to_fields()),
        Reply::List(items) => items.into_iter().map(encode_plain).collect(),
        // Selected as Shape::Cursor before reaching here.
        Reply::Cursor(cursor) => Err(RouteError::internal(format!(
            "unmaterialized {} cursor",
            cursor.record_type().name()
        ))),
    }
}
