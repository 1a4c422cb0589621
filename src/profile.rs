//! Profiles: ordered fields joined by a separator.
//!
//! [`Profile::solve`] composes a name from positional and keyword values in
//! three strict passes, never revisiting a slot once it is filled:
//!
//! 1. Keyword values go straight to the field they name.
//! 2. Each positional value is offered to the still-empty fields in
//!    declared order; the first field that claims it takes it.
//! 3. Values nobody claimed fill the remaining empty fields in order.
//!
//! Fields with a default start out filled, so only required fields take
//! part in passes 2 and 3.

use nameforge_store::{DEFAULT_SEPARATOR, ProfileRecord};
use serde_json::Value;

use crate::error::{NamingError, Result};
use crate::field::{Field, is_candidate};

/// Field name to decoded value, in field order.
pub type Decomposed = Vec<(String, Value)>;

/// An ordered collection of fields that composes and decomposes names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    fields: Vec<Field>,
    separator: String,
}

impl Profile {
    /// Create an empty profile using the default `_` separator
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Builder method to set the separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Result<Self> {
        self.set_separator(separator)?;
        Ok(self)
    }

    /// Builder method to append a field
    pub fn with_field(mut self, field: Field) -> Result<Self> {
        self.push_field(field)?;
        Ok(self)
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Separator placed between segments
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Change the separator. Empty separators are rejected.
    pub fn set_separator(&mut self, separator: impl Into<String>) -> Result<()> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(NamingError::InvalidProfile {
                name: self.name.clone(),
                reason: "separator cannot be empty".to_string(),
            });
        }
        self.separator = separator;
        Ok(())
    }

    /// Append a field. Each field may appear once per profile.
    pub fn push_field(&mut self, field: Field) -> Result<()> {
        if self.position(field.name()).is_some() {
            return Err(NamingError::DuplicateField(field.name().to_string()));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Fields in composition order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field names in composition order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the profile has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Replace the copy of a field held by this profile, if present.
    pub(crate) fn replace_field(&mut self, field: &Field) -> bool {
        match self.position(field.name()) {
            Some(index) => {
                self.fields[index] = field.clone();
                true
            }
            None => false,
        }
    }

    /// Drop a field from this profile, if present.
    pub(crate) fn remove_field(&mut self, name: &str) -> Option<Field> {
        self.position(name).map(|index| self.fields.remove(index))
    }

    /// Persistable form of this profile.
    pub fn to_record(&self, order: usize) -> ProfileRecord {
        ProfileRecord {
            fields: self.fields.iter().map(|f| f.name().to_string()).collect(),
            separator: self.separator.clone(),
            order,
        }
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Compose a name from positional `values` and keyword `named` values.
    ///
    /// The number of positional values must equal the number of required
    /// fields not already supplied by keyword. Fails rather than producing a
    /// name with missing or extra segments.
    pub fn solve(&self, values: &[Value], named: &[(&str, Value)]) -> Result<String> {
        let mut slots: Vec<Option<String>> = self
            .fields
            .iter()
            .map(|f| f.default().map(str::to_string))
            .collect();

        // Keyword values bypass matching
        for (key, value) in named {
            let index = self
                .position(key)
                .ok_or_else(|| NamingError::UnknownField((*key).to_string()))?;
            let field = &self.fields[index];
            let token = field.resolve(value).ok_or_else(|| {
                NamingError::Unresolvable(format!(
                    "value {value} is not valid for field '{}'",
                    field.name()
                ))
            })?;
            slots[index] = Some(token);
        }

        let open = slots.iter().filter(|slot| slot.is_none()).count();
        if open != values.len() {
            return Err(NamingError::Unresolvable(format!(
                "profile '{}' expects {open} positional values, got {}",
                self.name,
                values.len()
            )));
        }

        // First still-empty field in declared order that claims a value takes it
        let mut leftovers = Vec::new();
        for value in values {
            if !is_candidate(value) {
                log::warn!(
                    "Profile '{}' received unsupported value {}",
                    self.name,
                    value
                );
            }
            let claimed = self.fields.iter().enumerate().find_map(|(index, field)| {
                if slots[index].is_some() {
                    return None;
                }
                field.claim(value).map(|token| (index, token))
            });
            match claimed {
                Some((index, token)) => {
                    log::debug!(
                        "Field '{}' claimed {} as '{}'",
                        self.fields[index].name(),
                        value,
                        token
                    );
                    slots[index] = Some(token);
                }
                None => leftovers.push(value),
            }
        }

        // Leftovers fill the remaining fields positionally
        let mut leftovers = leftovers.into_iter();
        for (index, field) in self.fields.iter().enumerate() {
            if slots[index].is_some() {
                continue;
            }
            let value = leftovers.next().ok_or_else(|| {
                NamingError::Unresolvable(format!(
                    "required field '{}' was not supplied",
                    field.name()
                ))
            })?;
            let token = field.resolve(value).ok_or_else(|| {
                NamingError::Unresolvable(format!(
                    "value {value} is not valid for field '{}'",
                    field.name()
                ))
            })?;
            slots[index] = Some(token);
        }

        let mut tokens = Vec::with_capacity(slots.len());
        for (field, slot) in self.fields.iter().zip(slots) {
            let token = slot.ok_or_else(|| {
                NamingError::Unresolvable(format!("field '{}' is unresolved", field.name()))
            })?;
            if token.contains(self.separator.as_str()) {
                return Err(NamingError::Unresolvable(format!(
                    "token '{token}' for field '{}' contains the separator '{}'",
                    field.name(),
                    self.separator
                )));
            }
            tokens.push(token);
        }

        // A token can end with part of a multi-character separator and shift
        // the split point; the name must split back into the same tokens.
        let name = tokens.join(self.separator.as_str());
        if !name.split(self.separator.as_str()).eq(tokens.iter().map(String::as_str)) {
            return Err(NamingError::Unresolvable(format!(
                "'{name}' does not split back into its tokens on separator '{}'",
                self.separator
            )));
        }
        log::debug!("Profile '{}' composed '{}'", self.name, name);
        Ok(name)
    }

    /// Split a name into its segments and decode each with its field.
    pub fn unsolve(&self, name: &str) -> Result<Decomposed> {
        if self.fields.is_empty() {
            return if name.is_empty() {
                Ok(Vec::new())
            } else {
                Err(NamingError::malformed(name, "profile has no fields"))
            };
        }

        let parts: Vec<&str> = name.split(self.separator.as_str()).collect();
        if parts.len() != self.fields.len() {
            return Err(NamingError::malformed(
                name,
                format!(
                    "expected {} segments separated by '{}', found {}",
                    self.fields.len(),
                    self.separator,
                    parts.len()
                ),
            ));
        }

        self.fields
            .iter()
            .zip(parts)
            .map(|(field, part)| {
                field
                    .unsolve(part)
                    .map(|value| (field.name().to_string(), value))
                    .ok_or_else(|| {
                        NamingError::malformed(
                            name,
                            format!("segment '{part}' is not valid for field '{}'", field.name()),
                        )
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldOptions;
    use serde_json::json;

    fn side() -> Field {
        Field::from_payload(
            "side",
            &json!({"l": "L", "r": "R", "m": "M"}),
            &FieldOptions::new().with_default("m"),
        )
        .unwrap()
    }

    fn description() -> Field {
        Field::from_payload("description", &json!(""), &FieldOptions::new()).unwrap()
    }

    fn enumerator() -> Field {
        Field::from_payload("enumerator", &json!(0), &FieldOptions::new().padding(3)).unwrap()
    }

    fn asset() -> Profile {
        Profile::new("asset")
            .with_field(side())
            .and_then(|p| p.with_field(description()))
            .and_then(|p| p.with_field(enumerator()))
            .unwrap()
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new("DG");
        assert_eq!(profile.name(), "DG");
        assert_eq!(profile.separator(), "_");
        assert!(profile.is_empty());
    }

    #[test]
    fn test_empty_profile_solves_to_empty_string() {
        assert_eq!(Profile::new("empty").solve(&[], &[]).unwrap(), "");
        assert!(Profile::new("empty").unsolve("").unwrap().is_empty());
    }

    #[test]
    fn test_composes_in_field_order() {
        let name = asset()
            .solve(&[json!("rig"), json!(1)], &[("side", json!("l"))])
            .unwrap();
        assert_eq!(name, "L_rig_001");
    }

    #[test]
    fn test_positional_order_does_not_matter_for_distinct_types() {
        let name = asset()
            .solve(&[json!(1), json!("rig")], &[("side", json!("l"))])
            .unwrap();
        assert_eq!(name, "L_rig_001");
    }

    #[test]
    fn test_default_fills_unsupplied_field() {
        let name = asset().solve(&[json!("rig"), json!(7)], &[]).unwrap();
        assert_eq!(name, "M_rig_007");
    }

    #[test]
    fn test_keyword_fills_required_field() {
        let name = asset()
            .solve(&[json!("rig")], &[("enumerator", json!(12))])
            .unwrap();
        assert_eq!(name, "M_rig_012");
    }

    #[test]
    fn test_count_mismatch_fails() {
        let err = asset().solve(&[json!("rig")], &[]).unwrap_err();
        assert!(err.to_string().contains("expects 2 positional values, got 1"));

        let err = asset()
            .solve(&[json!("l"), json!("rig"), json!(1)], &[])
            .unwrap_err();
        assert!(matches!(err, NamingError::Unresolvable(_)));
    }

    #[test]
    fn test_unknown_keyword_fails() {
        let err = asset()
            .solve(&[json!("rig"), json!(1)], &[("colour", json!("red"))])
            .unwrap_err();
        assert!(matches!(err, NamingError::UnknownField(name) if name == "colour"));
    }

    #[test]
    fn test_invalid_keyword_value_fails() {
        let err = asset()
            .solve(&[json!("rig"), json!(1)], &[("side", json!("x"))])
            .unwrap_err();
        assert!(err.to_string().contains("not valid for field 'side'"));
    }

    #[test]
    fn test_first_declared_field_wins_a_shared_code() {
        let a = Field::from_payload("a", &json!({"x": "A"}), &FieldOptions::new()).unwrap();
        let b =
            Field::from_payload("b", &json!({"x": "B", "y": "Y"}), &FieldOptions::new()).unwrap();
        let profile = Profile::new("pair")
            .with_field(a)
            .and_then(|p| p.with_field(b))
            .unwrap();

        assert_eq!(profile.solve(&[json!("x"), json!("x")], &[]).unwrap(), "A_B");
        assert_eq!(profile.solve(&[json!("y"), json!("x")], &[]).unwrap(), "A_Y");
    }

    #[test]
    fn test_string_field_does_not_steal_mapping_codes() {
        let side = Field::from_payload("side", &json!({"l": "L"}), &FieldOptions::new()).unwrap();
        let profile = Profile::new("desc-first")
            .with_field(description())
            .and_then(|p| p.with_field(side))
            .unwrap();

        assert_eq!(profile.solve(&[json!("l"), json!("rig")], &[]).unwrap(), "rig_L");
    }

    #[test]
    fn test_unresolvable_leftover_fails() {
        let side = Field::from_payload("side", &json!({"l": "L"}), &FieldOptions::new()).unwrap();
        let profile = Profile::new("p")
            .with_field(side)
            .and_then(|p| p.with_field(enumerator()))
            .unwrap();

        let err = profile.solve(&[json!("q"), json!(3)], &[]).unwrap_err();
        assert!(err.to_string().contains("not valid for field 'side'"));
    }

    #[test]
    fn test_token_containing_separator_fails() {
        let err = asset()
            .solve(&[json!("left_arm"), json!(1)], &[])
            .unwrap_err();
        assert!(err.to_string().contains("contains the separator"));
    }

    #[test]
    fn test_token_overlapping_separator_fails() {
        let a = Field::from_payload("a", &json!(""), &FieldOptions::new()).unwrap();
        let b = Field::from_payload("b", &json!(""), &FieldOptions::new()).unwrap();
        let profile = Profile::new("dashed")
            .with_separator("--")
            .and_then(|p| p.with_field(a))
            .and_then(|p| p.with_field(b))
            .unwrap();

        assert!(matches!(
            profile.solve(&[json!("x-"), json!("y")], &[]),
            Err(NamingError::Unresolvable(_))
        ));
        assert!(matches!(
            profile.solve(&[json!("x"), json!("-y")], &[]),
            Err(NamingError::Unresolvable(_))
        ));

        let name = profile.solve(&[json!("x-y"), json!("z")], &[]).unwrap();
        assert_eq!(name, "x-y--z");
        assert_eq!(
            profile.unsolve(&name).unwrap(),
            vec![("a".to_string(), json!("x-y")), ("b".to_string(), json!("z"))]
        );
    }

    #[test]
    fn test_integer_values_go_to_integer_field_before_string_field() {
        let profile = Profile::new("numbered")
            .with_field(description())
            .and_then(|p| p.with_field(enumerator()))
            .unwrap();
        assert_eq!(profile.solve(&[json!(1), json!(2)], &[]).unwrap(), "2_001");
    }

    #[test]
    fn test_custom_separator() {
        let profile = asset().with_separator("-").unwrap();
        let name = profile
            .solve(&[json!("left_arm"), json!(2)], &[("side", json!("r"))])
            .unwrap();
        assert_eq!(name, "R-left_arm-002");
        assert!(Profile::new("x").with_separator("").is_err());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut profile = Profile::new("p");
        profile.push_field(description()).unwrap();
        assert!(matches!(
            profile.push_field(description()),
            Err(NamingError::DuplicateField(_))
        ));
    }

    #[test]
    fn test_unsolve_decodes_each_segment() {
        let decoded = asset().unsolve("L_rig_001").unwrap();
        assert_eq!(
            decoded,
            vec![
                ("side".to_string(), json!("l")),
                ("description".to_string(), json!("rig")),
                ("enumerator".to_string(), json!(1)),
            ]
        );
    }

    #[test]
    fn test_unsolve_segment_count_mismatch() {
        let err = asset().unsolve("L_rig").unwrap_err();
        assert!(err.to_string().contains("expected 3 segments"));
        assert!(asset().unsolve("L_rig_001_x").is_err());
    }

    #[test]
    fn test_unsolve_bad_segment() {
        let err = asset().unsolve("Q_rig_001").unwrap_err();
        assert!(matches!(err, NamingError::MalformedName { .. }));
    }

    #[test]
    fn test_roundtrip() {
        let profile = asset();
        let name = profile
            .solve(&[json!("spine"), json!(42)], &[("side", json!("r"))])
            .unwrap();
        let decoded = profile.unsolve(&name).unwrap();
        assert_eq!(decoded[0].1, json!("r"));
        assert_eq!(decoded[1].1, json!("spine"));
        assert_eq!(decoded[2].1, json!(42));
    }

    #[test]
    fn test_record_lists_fields_in_order() {
        let record = asset().to_record(3);
        assert_eq!(record.fields, vec!["side", "description", "enumerator"]);
        assert_eq!(record.separator, "_");
        assert_eq!(record.order, 3);
    }
}
