//! Ordered wire body.

use std::fmt;

use crate::{
    error::{GatewayError, Result},
    fields::{Field, is_sensitive_wire_name},
};

/// Ordered mapping of wire field names to string values.
///
/// Inserting an existing key replaces its value in place; new keys are
/// appended. Serializes to `application/x-www-form-urlencoded` in insertion
/// order. `Debug` never shows the values of sensitive fields.
///
/// # Examples
///
/// ```
/// use converge_gateway::{fields::Field, request::WireBody};
///
/// let mut body = WireBody::new();
/// body.insert(Field::ResultFormat, "HTML");
/// body.insert(Field::TransactionReference, "SALE123");
/// body.insert(Field::ResultFormat, "ASCII");
///
/// assert_eq!(body.to_form_encoded().unwrap(), "ssl_result_format=ASCII&ssl_txn_id=SALE123");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WireBody {
    pairs: Vec<(&'static str, String)>,
}

impl WireBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Sets a known field.
    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.insert_wire(field.wire_name(), value);
    }

    /// Sets a field by wire name.
    pub fn insert_wire(&mut self, wire_name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(key, _)| *key == wire_name) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((wire_name, value)),
        }
    }

    /// Sets a field only when a non-empty value is given.
    pub fn insert_opt(&mut self, field: Field, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.insert(field, value);
        }
    }

    /// Merges `other` over `self`, with `other`'s values winning.
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.pairs {
            self.insert_wire(key, value);
        }
    }

    /// Value of a field by wire name.
    #[must_use]
    pub fn get(&self, wire_name: &str) -> Option<&str> {
        self.pairs.iter().find(|(key, _)| *key == wire_name).map(|(_, value)| value.as_str())
    }

    /// Returns true if the wire name is present.
    #[must_use]
    pub fn contains(&self, wire_name: &str) -> bool {
        self.get(wire_name).is_some()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Wire names in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(key, _)| *key)
    }

    /// `(wire name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Encodes the body as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TransportError`] if encoding fails.
    pub fn to_form_encoded(&self) -> Result<String> {
        serde_urlencoded::to_string(&self.pairs)
            .map_err(|e| GatewayError::TransportError(format!("cannot encode form body: {e}")))
    }
}

impl fmt::Debug for WireBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.pairs {
            if is_sensitive_wire_name(key) {
                map.entry(key, &"***");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}
