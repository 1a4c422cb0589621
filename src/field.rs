//! Typed naming fields.
//!
//! A [`Field`] is one segment of a composed name. Its [`FieldKind`] decides
//! how candidate values become tokens:
//!
//! | Kind      | Candidate            | Token                     |
//! |-----------|----------------------|---------------------------|
//! | `String`  | text or integer      | the text itself           |
//! | `Mapping` | a known code         | the code's display token  |
//! | `Integer` | integer or digits    | zero-padded to `padding`  |
//!
//! Candidates are `serde_json::Value`s. Anything other than a string or an
//! integer (null, bool, float, array, object) is reported and ignored.

use std::collections::{BTreeMap, BTreeSet};

use nameforge_store::{FieldKind, FieldRecord};
use serde_json::Value;

use crate::error::{NamingError, Result};

/// Optional settings used when defining a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Value used when no input resolves the field. Normalized to a
    /// canonical token at construction.
    pub default: Option<Value>,

    /// Zero-fill width for integer fields
    pub padding: usize,

    /// `Some(false)` without a default synthesizes one from the payload.
    /// `Some(true)` together with a default is rejected.
    pub required: Option<bool>,
}

impl FieldOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Builder method to set integer padding
    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Builder method to set whether the field is required
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// Zero-pad `n` to `width` digits.
fn pad(n: i64, width: usize) -> String {
    format!("{n:0width$}")
}

/// Whether `value` has a shape any field kind understands.
pub fn is_candidate(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Number(n) => n.is_i64(),
        _ => false,
    }
}

/// Derive a field kind from the shape of a JSON payload.
///
/// Strings become `String`, objects whose values are all strings become
/// `Mapping`, integers become `Integer` with the given padding.
pub fn kind_from_payload(name: &str, payload: &Value, padding: usize) -> Result<FieldKind> {
    match payload {
        Value::String(value) => Ok(FieldKind::String {
            value: value.clone(),
        }),
        Value::Object(object) => {
            let mut value = BTreeMap::new();
            for (code, token) in object {
                let Value::String(token) = token else {
                    return Err(NamingError::invalid_field(
                        name,
                        format!("mapping value for '{code}' must be a string, got {token}"),
                    ));
                };
                value.insert(code.clone(), token.clone());
            }
            Ok(FieldKind::Mapping { value })
        }
        Value::Number(n) => match n.as_i64() {
            Some(value) => Ok(FieldKind::Integer { value, padding }),
            None => Err(NamingError::invalid_field(
                name,
                format!("integer payload out of range or fractional: {n}"),
            )),
        },
        other => Err(NamingError::invalid_field(
            name,
            format!("payload must be a string, object or integer, got {other}"),
        )),
    }
}

/// One typed segment of a composed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    kind: FieldKind,
    default: Option<String>,
}

impl Field {
    /// Create a required field of an explicit kind
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Create a field of an explicit kind with options applied.
    pub fn with_options(
        name: impl Into<String>,
        kind: FieldKind,
        options: &FieldOptions,
    ) -> Result<Self> {
        let mut field = Self::new(name, kind);

        if options.padding > 0 {
            match &mut field.kind {
                FieldKind::Integer { padding, .. } => *padding = options.padding,
                other => {
                    return Err(NamingError::invalid_field(
                        &field.name,
                        format!("padding only applies to integer fields, not {}", other.type_name()),
                    ));
                }
            }
        }

        field.default = match (&options.default, options.required) {
            (Some(_), Some(true)) => {
                return Err(NamingError::invalid_field(
                    &field.name,
                    "a field with a default cannot be required",
                ));
            }
            (Some(value), _) => Some(field.normalize_default(value)?),
            (None, Some(false)) => Some(field.synthesized_default()?),
            (None, _) => None,
        };

        log::debug!(
            "Defined {} field '{}' (default: {:?})",
            field.kind.type_name(),
            field.name,
            field.default
        );
        Ok(field)
    }

    /// Create a field whose kind is derived from a JSON payload.
    pub fn from_payload(
        name: impl Into<String>,
        payload: &Value,
        options: &FieldOptions,
    ) -> Result<Self> {
        let name = name.into();
        let kind = kind_from_payload(&name, payload, options.padding)?;
        Self::with_options(name, kind, options)
    }

    /// Rebuild a field from its persisted record.
    pub fn from_record(name: impl Into<String>, record: &FieldRecord) -> Result<Self> {
        let mut field = Self::new(name, record.kind.clone());
        if let Some(token) = &record.default {
            if !field.accepts_token(token) {
                return Err(NamingError::invalid_field(
                    &field.name,
                    format!("stored default '{token}' is not a valid token"),
                ));
            }
            field.default = Some(token.clone());
        }
        if record.required != field.required() {
            log::warn!(
                "Field '{}' stored required={} but default is {:?}; using the default",
                field.name,
                record.required,
                field.default
            );
        }
        Ok(field)
    }

    /// Persistable form of this field.
    pub fn to_record(&self, order: usize) -> FieldRecord {
        FieldRecord {
            kind: self.kind.clone(),
            default: self.default.clone(),
            required: self.required(),
            order,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed payload
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Canonical default token, if any
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// True iff the field has no default
    pub fn required(&self) -> bool {
        self.default.is_none()
    }

    /// Zero-fill width; always 0 for non-integer fields
    pub fn padding(&self) -> usize {
        match self.kind {
            FieldKind::Integer { padding, .. } => padding,
            _ => 0,
        }
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Replace the payload. The new payload must have the same kind.
    pub fn set_value(&mut self, payload: &Value) -> Result<()> {
        let kind = kind_from_payload(&self.name, payload, self.padding())?;
        if !kind.same_type(&self.kind) {
            return Err(NamingError::invalid_field(
                &self.name,
                format!(
                    "cannot change a {} field into a {} field",
                    self.kind.type_name(),
                    kind.type_name()
                ),
            ));
        }

        let previous = std::mem::replace(&mut self.kind, kind);
        if let Some(token) = &self.default
            && !self.accepts_token(token)
        {
            let token = token.clone();
            self.kind = previous;
            return Err(NamingError::invalid_field(
                &self.name,
                format!("new payload does not contain the default '{token}'"),
            ));
        }
        Ok(())
    }

    /// Set or clear the default. Clearing makes the field required.
    pub fn set_default(&mut self, default: Option<&Value>) -> Result<()> {
        self.default = match default {
            Some(value) => Some(self.normalize_default(value)?),
            None => None,
        };
        Ok(())
    }

    /// Change the zero-fill width of an integer field. A numeric default is
    /// re-padded to the new width.
    pub fn set_padding(&mut self, width: usize) -> Result<()> {
        let type_name = self.kind.type_name();
        let FieldKind::Integer { padding, .. } = &mut self.kind else {
            return Err(NamingError::invalid_field(
                &self.name,
                format!("padding only applies to integer fields, not {type_name}"),
            ));
        };
        *padding = width;
        if let Some(token) = &self.default
            && let Ok(n) = token.parse::<i64>()
        {
            self.default = Some(pad(n, width));
        }
        Ok(())
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Coerce a value routed to this field into a token.
    ///
    /// Used for keyword values and leftover positional values. Does not fall
    /// back to the default.
    pub fn resolve(&self, value: &Value) -> Option<String> {
        match (&self.kind, value) {
            (FieldKind::String { .. }, Value::String(text)) => Some(text.clone()),
            (FieldKind::String { .. }, Value::Number(n)) if n.is_i64() => Some(n.to_string()),
            (FieldKind::Mapping { value: map }, Value::String(code)) => map.get(code).cloned(),
            (FieldKind::Mapping { value: map }, Value::Number(n)) if n.is_i64() => {
                map.get(&n.to_string()).cloned()
            }
            (FieldKind::Integer { padding, .. }, Value::Number(n)) => {
                n.as_i64().map(|n| pad(n, *padding))
            }
            (FieldKind::Integer { padding, .. }, Value::String(text)) => {
                text.trim().parse::<i64>().ok().map(|n| pad(n, *padding))
            }
            _ => None,
        }
    }

    /// Whether this field claims a positional value during the greedy pass.
    ///
    /// String fields never claim; they take whatever is left over once the
    /// typed fields have had their pick. Integer fields only claim actual
    /// integers, so digit-only text stays available as free-form input.
    pub fn claim(&self, value: &Value) -> Option<String> {
        match (&self.kind, value) {
            (FieldKind::String { .. }, _) => None,
            (FieldKind::Integer { .. }, Value::String(_)) => None,
            _ => self.resolve(value),
        }
    }

    /// All tokens this field resolves to from `values`.
    ///
    /// Falls back to the default when no candidate produces a token. Does
    /// not pick a winner when several candidates resolve.
    pub fn solve<I>(&self, values: I) -> BTreeSet<String>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut tokens = BTreeSet::new();
        for value in values {
            let value = value.into();
            if !is_candidate(&value) {
                log::warn!(
                    "Field '{}' ignoring unsupported candidate {}",
                    self.name,
                    value
                );
                continue;
            }
            if let Some(token) = self.resolve(&value) {
                tokens.insert(token);
            }
        }

        if tokens.is_empty()
            && let Some(default) = &self.default
        {
            tokens.insert(default.clone());
        }
        tokens
    }

    /// Decode a name segment back to the value that produced it.
    ///
    /// Mapping fields reverse-look-up the code (the first code in sorted
    /// order wins if two codes share a token), integer fields parse and drop
    /// padding, string fields return the segment unchanged. A string field
    /// fed an integer therefore decodes it as text (`3` comes back as `"3"`).
    pub fn unsolve(&self, segment: &str) -> Option<Value> {
        match &self.kind {
            FieldKind::String { .. } => Some(Value::String(segment.to_string())),
            FieldKind::Mapping { value: map } => map
                .iter()
                .find(|(_, token)| token.as_str() == segment)
                .map(|(code, _)| Value::String(code.clone())),
            FieldKind::Integer { .. } => segment.parse::<i64>().ok().map(Value::from),
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Whether `token` could have been produced by this field.
    fn accepts_token(&self, token: &str) -> bool {
        match &self.kind {
            FieldKind::String { .. } => true,
            FieldKind::Mapping { value: map } => map.values().any(|t| t == token),
            FieldKind::Integer { .. } => token.parse::<i64>().is_ok(),
        }
    }

    /// Turn a user-supplied default into a canonical token. Mapping defaults
    /// may be given as a code or as a token.
    fn normalize_default(&self, value: &Value) -> Result<String> {
        if let Some(token) = self.resolve(value) {
            return Ok(token);
        }
        if let Value::String(token) = value
            && matches!(self.kind, FieldKind::Mapping { .. })
            && self.accepts_token(token)
        {
            return Ok(token.clone());
        }
        Err(NamingError::invalid_field(
            &self.name,
            format!(
                "default {value} is not valid for a {} field",
                self.kind.type_name()
            ),
        ))
    }

    fn synthesized_default(&self) -> Result<String> {
        match &self.kind {
            FieldKind::String { value } => Ok(value.clone()),
            FieldKind::Integer { value, padding } => Ok(pad(*value, *padding)),
            FieldKind::Mapping { .. } => Err(NamingError::invalid_field(
                &self.name,
                "an optional mapping field needs an explicit default",
            )),
        }
    }
}
