//! PDF object model: the node variants making up a rebuilt document

use std::fmt;
use super::{Dictionary, Stream};

/// Handle of a node inside an [`ObjectGraph`](super::ObjectGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in construction order
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variant tag of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Boolean,
    Number,
    String,
    Name,
    Array,
    Dictionary,
    Stream,
    Null,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ObjectType {
    /// Lower-case name of the variant
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Boolean => "boolean",
            ObjectType::Number => "number",
            ObjectType::String => "string",
            ObjectType::Name => "name",
            ObjectType::Array => "array",
            ObjectType::Dictionary => "dictionary",
            ObjectType::Stream => "stream",
            ObjectType::Null => "null",
        }
    }
}

/// Numeric value, integer or real
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f32),
}

impl Number {
    /// Check if the number was read as an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    /// Integer view; reals are truncated
    pub fn as_integer(&self) -> i64 {
        match *self {
            Number::Integer(i) => i,
            Number::Real(r) => r as i64,
        }
    }

    /// Real view of the number
    pub fn as_real(&self) -> f32 {
        match *self {
            Number::Integer(i) => i as f32,
            Number::Real(r) => r,
        }
    }
}

/// Node payload
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Number(Number),
    /// Opaque bytes, not necessarily text
    String(Vec<u8>),
    /// Name bytes without the leading slash, not necessarily UTF-8
    Name(Vec<u8>),
    Array(Vec<NodeId>),
    Dictionary(Dictionary),
    Stream(Stream),
    Null,
}

/// A node of the rebuilt document
///
/// Every node starts with a reference count of one. The builder bumps the
/// count each time the same source object is reached again, and the
/// indirection pass hands out an object number to nodes that end up
/// indirect.
#[derive(Debug, Clone)]
pub struct PDFObject {
    value: Value,
    ref_count: usize,
    id: Option<u32>,
}

impl PDFObject {
    /// Create new node from a value
    pub fn new(value: Value) -> Self {
        Self {
            value,
            ref_count: 1,
            id: None,
        }
    }

    /// Create new boolean node
    pub fn boolean(value: bool) -> Self {
        Self::new(Value::Boolean(value))
    }

    /// Create new integer node
    pub fn integer(value: i64) -> Self {
        Self::new(Value::Number(Number::Integer(value)))
    }

    /// Create new real node
    pub fn real(value: f32) -> Self {
        Self::new(Value::Number(Number::Real(value)))
    }

    /// Create new string node
    pub fn string(value: impl Into<Vec<u8>>) -> Self {
        Self::new(Value::String(value.into()))
    }

    /// Create new name node
    pub fn name(value: impl Into<Vec<u8>>) -> Self {
        Self::new(Value::Name(value.into()))
    }

    /// Create new empty array node
    pub fn array() -> Self {
        Self::new(Value::Array(Vec::new()))
    }

    /// Create new empty dictionary node
    pub fn dictionary() -> Self {
        Self::new(Value::Dictionary(Dictionary::new()))
    }

    /// Create new stream node
    pub fn stream(stream: Stream) -> Self {
        Self::new(Value::Stream(stream))
    }

    /// Create new null node
    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    /// Variant tag
    pub fn object_type(&self) -> ObjectType {
        match self.value {
            Value::Boolean(_) => ObjectType::Boolean,
            Value::Number(_) => ObjectType::Number,
            Value::String(_) => ObjectType::String,
            Value::Name(_) => ObjectType::Name,
            Value::Array(_) => ObjectType::Array,
            Value::Dictionary(_) => ObjectType::Dictionary,
            Value::Stream(_) => ObjectType::Stream,
            Value::Null => ObjectType::Null,
        }
    }

    /// Node payload
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.value {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self.value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[NodeId]> {
        match &self.value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match &self.value {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match &self.value {
            Value::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_stream_mut(&mut self) -> Option<&mut Stream> {
        match &mut self.value {
            Value::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    /// Number of reference sites pointing at this node
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    pub(crate) fn increment_ref(&mut self) {
        self.ref_count += 1;
    }

    /// Assigned object number, if the node is written as an indirect object
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    /// Check if the node must be written once in the body and referenced elsewhere
    pub fn is_indirect(&self) -> bool {
        self.ref_count > 1
            || matches!(self.value, Value::Dictionary(_) | Value::Stream(_))
    }

    /// Attach a child reference to an array, dictionary or stream node
    ///
    /// Returns `false` when the node cannot hold the child.
    pub(crate) fn attach(&mut self, key: Option<Vec<u8>>, child: NodeId) -> bool {
        match (&mut self.value, key) {
            (Value::Array(items), None) => items.push(child),
            (Value::Dictionary(dict), Some(key)) => dict.insert(key, child),
            (Value::Stream(stream), Some(key)) => stream.dict_mut().insert(key, child),
            _ => return false,
        }
        true
    }
}
