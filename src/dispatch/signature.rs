//! Declared handler signatures.

use serde_json::Value;

use crate::model::{ModelType, Record, RecordType, Schema, SchemaType};

/// Parameter name that receives the [`RequestContext`](crate::RequestContext) itself.
pub const CONTEXT_PARAM: &str = "request";

/// How a parameter is bound.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Looked up by name in query, then body, then default.
    Scalar,
    /// Built from the whole body mapping.
    Schema(SchemaType),
}

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
}

impl Param {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Scalar,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::scalar(name)
        }
    }

    pub fn schema<T: Schema>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Schema(SchemaType::of::<T>()),
            default: None,
        }
    }

    pub fn is_context(&self) -> bool {
        self.name == CONTEXT_PARAM
    }
}

/// Declared return type of a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Returns {
    /// Nothing declared.
    #[default]
    Unspecified,
    /// An opaque, already JSON-encodable value.
    Json,
    Schema(SchemaType),
    Record(RecordType),
    /// A list whose elements are all of one model type.
    List(ModelType),
}

impl Returns {
    pub fn schema<T: Schema>() -> Self {
        Returns::Schema(SchemaType::of::<T>())
    }

    pub fn record<T: Record>() -> Self {
        Returns::Record(RecordType::of::<T>())
    }

    pub fn list_of_schema<T: Schema>() -> Self {
        Returns::List(ModelType::Schema(SchemaType::of::<T>()))
    }

    pub fn list_of_records<T: Record>() -> Self {
        Returns::List(ModelType::Record(RecordType::of::<T>()))
    }
}

/// Ordered parameters plus the return declaration, computed once per route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: Returns,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.returns = returns;
        self
    }
}
