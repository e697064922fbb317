//! Model kinds understood by the binder and serializer.
//!
//! # Responsibilities
//! - Validation models (`schema.rs`): serde types with semantic checks
//! - Records (`record.rs`): persisted rows with date/time-aware fields
//! - Cursors (`cursor.rs`): lazy record collections
//! - Replies (`reply.rs`): the closed set of values a handler may return
//!
//! # Design Decisions
//! - Types are described at runtime by small `Copy` descriptors keyed on
//!   `TypeId`, so a route's signature is plain data computed at registration
//! - Instances are captured into erased values (`SchemaValue`, `RecordValue`)
//!   as soon as a handler returns them

pub mod cursor;
pub mod record;
pub mod reply;
pub mod schema;

pub use cursor::{Cursor, QuerySet};
pub use record::{FieldValue, Record, RecordType, RecordValue};
pub use reply::Reply;
pub use schema::{Schema, SchemaInput, SchemaType, SchemaValue};

/// Either model kind, as the element type of a declared list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    Schema(SchemaType),
    Record(RecordType),
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::Schema(s) => s.name(),
            ModelType::Record(r) => r.name(),
        }
    }
}
