//! Ordered, nestable field container
//!
//! A [`Frame`] is a list of [`Field`]s, not a map:
//! - insertion order is preserved and significant
//! - names need not be unique; lookups return the first match
//! - a field's value may itself be a frame or an array
//!
//! The wire form of a frame is the concatenation of its fields' wire forms with
//! no outer length. When a frame is nested, the enclosing field's length
//! prefix carries the total.
//!
//! # Examples
//!
//! ```
//! use framestore_core::{Frame, Value};
//!
//! let mut person = Frame::new();
//! person.add("First", "Alice");
//! person.add("Last", "Smith");
//!
//! let mut team = Frame::new();
//! team.add("Team", vec![Value::Frame(person)]);
//!
//! assert_eq!(
//!     team.to_json().unwrap(),
//!     r#"{"Team":[{"First":"Alice","Last":"Smith"}]}"#
//! );
//!
//! let bytes = team.to_bytes().unwrap();
//! assert_eq!(Frame::from_bytes(&bytes).unwrap(), team);
//! ```

use crate::codec::decode_fields;
use crate::error::Result;
use crate::field::Field;
use crate::limits::Limits;
use crate::registry::registry;
use crate::value::Value;
use std::fmt;

/// Ordered collection of named or anonymous typed values
#[derive(Debug, Clone, Default)]
pub struct Frame {
    fields: Vec<Field>,
    modified: bool,
}

// Equality compares content only; the modified flag is bookkeeping.
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Frame {
    /// Create an empty frame
    pub fn new() -> Self {
        Frame::default()
    }

    /// Create an empty frame with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        Frame {
            fields: Vec::with_capacity(capacity),
            modified: false,
        }
    }

    /// Builder form of [`Frame::add`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(name, value);
        self
    }

    /// Append a named field, typed by its value
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.add_field(Field::new(name, value));
    }

    /// Append an anonymous field
    pub fn add_anonymous(&mut self, value: impl Into<Value>) {
        self.add_field(Field::anonymous(value));
    }

    /// Append a frame as an anonymous nested field
    pub fn add_frame(&mut self, frame: Frame) {
        self.add_anonymous(Value::Frame(frame));
    }

    /// Append a prepared field
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
        self.modified = true;
    }

    /// Replace the value of the first field named `name`, or append a new field
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.is_named(&name)) {
            Some(field) => field.set_value(value),
            None => self.fields.push(Field::new(name, value)),
        }
        self.modified = true;
    }

    /// Value of the first field named `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.field(name).map(Field::value)
    }

    /// First field named `name`
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_named(name))
    }

    /// Mutable access to the first nested frame named `name`
    pub fn frame_mut(&mut self, name: &str) -> Option<&mut Frame> {
        let field = self.fields.iter_mut().find(|f| f.is_named(name))?;
        let frame = field.value_mut().as_frame_mut()?;
        self.modified = true;
        Some(frame)
    }

    /// Field at position `index`
    pub fn field_at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Whether any field is named `name`
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Remove the first field named `name`
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        let index = self.fields.iter().position(|f| f.is_named(name))?;
        self.modified = true;
        Some(self.fields.remove(index))
    }

    /// Remove every field named `name`, returning how many were removed
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| !f.is_named(name));
        let removed = before - self.fields.len();
        if removed > 0 {
            self.modified = true;
        }
        removed
    }

    /// Merge another frame into this one
    ///
    /// Named fields replace the first same-named field here (or are appended);
    /// anonymous fields are appended.
    pub fn merge(&mut self, other: Frame) {
        for field in other.fields {
            match field.name().map(str::to_string) {
                Some(name) => self.put(name, field.into_value()),
                None => self.add_field(field),
            }
        }
    }

    /// Remove all fields
    pub fn clear(&mut self) {
        if !self.fields.is_empty() {
            self.modified = true;
        }
        self.fields.clear();
    }

    /// All fields, in order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Iterate over the fields, in order
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the frame has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the named fields, in order, duplicates included
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().filter_map(Field::name).collect()
    }

    /// A non-empty frame whose fields are all anonymous
    pub fn is_array(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(Field::is_anonymous)
    }

    /// Whether the frame changed since it was decoded or last marked clean
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Mark the frame as unmodified
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// Wire encoding: the concatenation of every field's encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(registry().limits())
    }

    /// Wire encoding with custom limits
    pub fn to_bytes_with(&self, limits: &Limits) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for field in &self.fields {
            field.write_to(&mut out, limits, 0)?;
        }
        Ok(out)
    }

    /// Decode a frame from its wire encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Frame> {
        Frame::from_bytes_with(bytes, registry().limits())
    }

    /// Decode a frame with custom limits
    pub fn from_bytes_with(bytes: &[u8], limits: &Limits) -> Result<Frame> {
        decode_fields(bytes, limits, 0)
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for Frame {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<Field> for Frame {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Frame {
            fields: iter.into_iter().collect(),
            modified: true,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
