//! Validation models.
//!
//! A validation model is a serde type that can be built from a field mapping,
//! checked, and re-emitted as a JSON field mapping. Construction always goes
//! through [`SchemaType::construct`], whether the input is a request body, a
//! handler's plain mapping, or an existing instance being re-validated.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;

use crate::error::{RouteError, RouteResult, ValidationErrors};

/// A schema-carrying type that validates a field mapping into a typed instance.
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct NewArticle { title: String, body: String }
///
/// impl Schema for NewArticle {
///     const NAME: &'static str = "NewArticle";
///
///     fn validate(&self) -> Result<(), ValidationErrors> {
///         let mut errors = ValidationErrors::new();
///         if self.title.trim().is_empty() {
///             errors.push(FieldError::new("title", "must not be blank"));
///         }
///         errors.into_result()
///     }
/// }
/// ```
pub trait Schema: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name used in type-mismatch messages.
    const NAME: &'static str;

    /// Semantic checks run after deserialization succeeded.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Input to the construct-and-validate step.
pub enum SchemaInput {
    /// An instance already built by the handler, already serialized to fields.
    Instance(SchemaValue),
    /// A plain field mapping.
    Fields(Value),
}

/// Runtime descriptor of a [`Schema`] type.
#[derive(Clone, Copy)]
pub struct SchemaType {
    name: &'static str,
    type_id: TypeId,
    build: fn(Value) -> Result<Box<dyn Any + Send + Sync>, ValidationErrors>,
    revalidate: fn(Value) -> RouteResult<Value>,
}

impl SchemaType {
    pub fn of<T: Schema>() -> Self {
        Self {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            build: build_boxed::<T>,
            revalidate: revalidate::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Build a typed instance from a field mapping, for handing to a handler.
    pub fn build(&self, fields: Value) -> Result<Box<dyn Any + Send + Sync>, ValidationErrors> {
        (self.build)(fields)
    }

    /// Construct-and-validate, returning the canonical field mapping.
    ///
    /// Invalid fields are a `Validation` error and an instance of another
    /// schema type is a `TypeMismatch`. Failing to encode an instance is a
    /// server-side fault and comes back as `Internal`.
    pub fn construct(&self, input: SchemaInput) -> RouteResult<Value> {
        let fields = match input {
            SchemaInput::Instance(instance) => {
                if instance.type_id != self.type_id {
                    return Err(RouteError::type_mismatch(format!(
                        "expected a {} instance, got a {} instance",
                        self.name, instance.name
                    )));
                }
                let name = instance.name;
                instance.fields.map_err(|e| encode_fault(name, e))?
            }
            SchemaInput::Fields(fields) => fields,
        };
        (self.revalidate)(fields)
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SchemaType").field(&self.name).finish()
    }
}

impl PartialEq for SchemaType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SchemaType {}

fn construct<T: Schema>(fields: Value) -> Result<T, ValidationErrors> {
    let instance: T =
        serde_json::from_value(fields).map_err(|e| ValidationErrors::from_serde(&e))?;
    instance.validate()?;
    Ok(instance)
}

fn build_boxed<T: Schema>(fields: Value) -> Result<Box<dyn Any + Send + Sync>, ValidationErrors> {
    Ok(Box::new(construct::<T>(fields)?))
}

fn revalidate<T: Schema>(fields: Value) -> RouteResult<Value> {
    let instance = construct::<T>(fields)?;
    serde_json::to_value(&instance).map_err(|e| encode_fault(T::NAME, e))
}

/// An instance that cannot be turned back into JSON.
pub(crate) fn encode_fault(name: &str, err: serde_json::Error) -> RouteError {
    RouteError::Internal(anyhow::Error::new(err).context(format!("encoding {name} instance")))
}

/// A schema instance returned by a handler.
pub struct SchemaValue {
    name: &'static str,
    type_id: TypeId,
    fields: Result<Value, serde_json::Error>,
}

impl SchemaValue {
    pub fn new<T: Schema>(instance: &T) -> Self {
        Self {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            fields: serde_json::to_value(instance),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The instance's own field mapping, without re-validation.
    pub fn into_fields(self) -> Result<Value, serde_json::Error> {
        self.fields
    }
}

impl fmt::Debug for SchemaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValue")
            .field("name", &self.name)
            .field("fields", &self.fields.as_ref().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Tag {
        label: String,
        #[serde(default)]
        weight: u32,
    }

    impl Schema for Tag {
        const NAME: &'static str = "Tag";

        fn validate(&self) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            if self.label.is_empty() {
                errors.push(FieldError::new("label", "must not be empty"));
            }
            errors.into_result()
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Other {
        label: String,
    }

    impl Schema for Other {
        const NAME: &'static str = "Other";
    }

    #[test]
    fn test_construct_fills_defaults() {
        let ty = SchemaType::of::<Tag>();
        let fields = ty.construct(SchemaInput::Fields(json!({ "label": "rust" }))).unwrap();

        assert_eq!(fields, json!({ "label": "rust", "weight": 0 }));
    }

    #[test]
    fn test_construct_runs_validate() {
        let ty = SchemaType::of::<Tag>();
        let err = ty
            .construct(SchemaInput::Fields(json!({ "label": "" })))
            .unwrap_err();

        match err {
            RouteError::Validation(errors) => {
                assert_eq!(errors.errors(), &[FieldError::new("label", "must not be empty")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_construct_rejects_foreign_instance() {
        let ty = SchemaType::of::<Tag>();
        let other = SchemaValue::new(&Other { label: "x".into() });

        assert!(matches!(
            ty.construct(SchemaInput::Instance(other)),
            Err(RouteError::TypeMismatch(_))
        ));
    }

    #[derive(Debug, Deserialize)]
    struct Sealed {
        #[allow(dead_code)]
        secret: String,
    }

    impl Serialize for Sealed {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("sealed values cannot be encoded"))
        }
    }

    impl Schema for Sealed {
        const NAME: &'static str = "Sealed";
    }

    #[test]
    fn test_encode_failure_is_internal() {
        let ty = SchemaType::of::<Sealed>();

        let from_fields = ty.construct(SchemaInput::Fields(json!({ "secret": "x" })));
        let from_instance = ty.construct(SchemaInput::Instance(SchemaValue::new(&Sealed {
            secret: "x".into(),
        })));

        for result in [from_fields, from_instance] {
            match result {
                Err(RouteError::Internal(e)) => {
                    assert_eq!(e.to_string(), "encoding Sealed instance");
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_build_downcasts() {
        let ty = SchemaType::of::<Tag>();
        let boxed = ty.build(json!({ "label": "db", "weight": 3 })).unwrap();

        let tag = boxed.downcast::<Tag>().unwrap();
        assert_eq!(*tag, Tag { label: "db".into(), weight: 3 });
    }
}
