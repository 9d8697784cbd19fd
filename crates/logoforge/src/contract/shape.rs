//! Shape contracts: the declared structure of a structured capability output.
//!
//! A contract does two jobs. It is serialized into the backend's response
//! schema so generation is steered toward the shape, and it validates what
//! comes back, since conformance is best-effort on the remote side.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Primitive and composite field shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    Number,
    /// A string restricted to a fixed vocabulary.
    OneOf(&'static [&'static str]),
    Array(Box<Shape>),
    Object(ObjectShape),
}

impl Shape {
    pub fn array_of(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Shape::String | Shape::OneOf(_) => "string",
            Shape::Number => "number",
            Shape::Array(_) => "array",
            Shape::Object(_) => "object",
        }
    }

    fn to_schema(&self) -> Value {
        match self {
            Shape::String => json!({ "type": "STRING" }),
            Shape::Number => json!({ "type": "NUMBER" }),
            Shape::OneOf(options) => json!({ "type": "STRING", "enum": options }),
            Shape::Array(item) => json!({ "type": "ARRAY", "items": item.to_schema() }),
            Shape::Object(object) => object.to_schema(),
        }
    }

    fn validate(&self, value: &Value, path: &str) -> Result<(), ShapeViolation> {
        let mismatch = || ShapeViolation::TypeMismatch {
            path: path.to_string(),
            expected: self.type_name(),
            found: json_type_name(value),
        };

        match self {
            Shape::String => value.is_string().then_some(()).ok_or_else(mismatch),
            Shape::Number => value.is_number().then_some(()).ok_or_else(mismatch),
            Shape::OneOf(options) => {
                let s = value.as_str().ok_or_else(mismatch)?;
                if options.contains(&s) {
                    Ok(())
                } else {
                    Err(ShapeViolation::NotAllowed {
                        path: path.to_string(),
                        value: s.to_string(),
                    })
                }
            }
            Shape::Array(item) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, v)| item.validate(v, &format!("{}[{}]", path, i)))
            }
            Shape::Object(object) => {
                let map = value.as_object().ok_or_else(mismatch)?;
                object.validate(map, path)
            }
        }
    }
}

/// A named field of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

/// Ordered field list of an object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    fields: Vec<Field>,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &'static str, shape: Shape) -> Self {
        self.fields.push(Field {
            name,
            shape,
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: &'static str, shape: Shape) -> Self {
        self.fields.push(Field {
            name,
            shape,
            required: false,
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.to_string()).collect()
    }

    fn to_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(field.name.to_string(), field.shape.to_schema());
        }

        let mut schema = json!({
            "type": "OBJECT",
            "properties": properties,
            "propertyOrdering": self.fields.iter().map(|f| f.name).collect::<Vec<_>>(),
        });

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }

        schema
    }

    fn validate(&self, map: &Map<String, Value>, path: &str) -> Result<(), ShapeViolation> {
        for field in &self.fields {
            let field_path = format!("{}.{}", path, field.name);
            match map.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ShapeViolation::MissingField { path: field_path });
                }
                None | Some(Value::Null) => {}
                Some(value) => field.shape.validate(value, &field_path)?,
            }
        }
        Ok(())
    }
}

/// Why a payload did not conform. Recovered locally, never surfaced as failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeViolation {
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),

    #[error("missing required field {path}")]
    MissingField { path: String },

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: value {value:?} is not an allowed option")]
    NotAllowed { path: String, value: String },
}

/// Structured output contract for one capability.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeContract {
    root: Shape,
    key: Option<&'static str>,
}

impl ShapeContract {
    /// A single record.
    pub fn object(shape: ObjectShape) -> Self {
        Self {
            root: Shape::Object(shape),
            key: None,
        }
    }

    /// A list of records.
    pub fn array_of(item: ObjectShape) -> Self {
        Self {
            root: Shape::array_of(Shape::Object(item)),
            key: None,
        }
    }

    /// Mark the field that identifies each record of an array contract.
    pub fn keyed_by(mut self, field: &'static str) -> Self {
        self.key = Some(field);
        self
    }

    pub fn key(&self) -> Option<&'static str> {
        self.key
    }

    pub fn is_array(&self) -> bool {
        matches!(self.root, Shape::Array(_))
    }

    /// The record shape: the root object, or the item of a root array.
    pub fn record(&self) -> Option<&ObjectShape> {
        match &self.root {
            Shape::Object(object) => Some(object),
            Shape::Array(item) => match item.as_ref() {
                Shape::Object(object) => Some(object),
                _ => None,
            },
            _ => None,
        }
    }

    /// Backend response schema.
    pub fn to_schema(&self) -> Value {
        self.root.to_schema()
    }

    /// Empty value of the contract's shape.
    pub fn empty(&self) -> Value {
        match self.root {
            Shape::Array(_) => Value::Array(Vec::new()),
            _ => Value::Object(Map::new()),
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), ShapeViolation> {
        self.root.validate(value, "$")
    }

    /// Parse and validate raw text.
    pub fn parse(&self, raw: &str) -> Result<Value, ShapeViolation> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ShapeViolation::NotJson(e.to_string()))?;
        self.validate(&value)?;
        Ok(value)
    }

    /// Parse raw text, falling back to the empty shape on any violation.
    pub fn decode_or_empty(&self, raw: Option<&str>) -> Value {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return self.empty();
        };

        match self.parse(raw) {
            Ok(value) => value,
            Err(violation) => {
                tracing::debug!(%violation, "Structured response did not match contract");
                self.empty()
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
