//! The naming registry: known fields, known profiles, the active profile
//! and the persistence driver.
//!
//! A [`Registry`] is an owned value; callers pass it wherever names are
//! composed. Fields and profiles keep their registration order, which
//! decides which profile becomes active when the active one is deleted.

use std::collections::HashMap;

use nameforge_store::{Driver, DriverKind, JsonDriver, RegistryState};
use serde_json::Value;

use crate::error::{NamingError, Result};
use crate::field::{Field, FieldOptions};
use crate::profile::{Decomposed, Profile};

/// Registry of fields and profiles with a single active profile.
#[derive(Debug, Default)]
pub struct Registry {
    /// All fields indexed by name
    fields: HashMap<String, Field>,

    /// Field names in registration order
    field_order: Vec<String>,

    /// All profiles indexed by name
    profiles: HashMap<String, Profile>,

    /// Profile names in registration order
    profile_order: Vec<String>,

    /// Name of the active profile
    active: Option<String>,

    /// Backend used by `save` and `load`
    driver: Option<Box<dyn Driver>>,
}

impl Registry {
    /// Create an empty registry with no driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the persistence driver
    pub fn with_driver(mut self, driver: Box<dyn Driver>) -> Self {
        self.set_driver(Some(driver));
        self
    }

    /// Build a registry from persisted state.
    pub fn from_state(state: RegistryState) -> Result<Self> {
        let mut registry = Self::new();
        registry.restore(state)?;
        Ok(registry)
    }

    /// Remove every field and profile. The driver is kept.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.field_order.clear();
        self.profiles.clear();
        self.profile_order.clear();
        self.active = None;
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// Register a field whose kind is derived from `payload`'s shape.
    pub fn add_field(
        &mut self,
        name: &str,
        payload: impl Into<Value>,
        options: FieldOptions,
    ) -> Result<&Field> {
        if self.fields.contains_key(name) {
            return Err(NamingError::DuplicateField(name.to_string()));
        }
        let field = Field::from_payload(name, &payload.into(), &options)?;
        self.insert_field(field)
    }

    /// Register an already-built field.
    pub fn insert_field(&mut self, field: Field) -> Result<&Field> {
        let name = field.name().to_string();
        if self.fields.contains_key(&name) {
            return Err(NamingError::DuplicateField(name));
        }
        log::info!(
            "Registered {} field '{}'",
            field.kind().type_name(),
            name
        );
        self.field_order.push(name.clone());
        Ok(self.fields.entry(name).or_insert(field))
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// All fields in registration order
    pub fn fields(&self) -> Vec<&Field> {
        self.field_order
            .iter()
            .filter_map(|name| self.fields.get(name))
            .collect()
    }

    /// Field names in registration order
    pub fn field_names(&self) -> Vec<&str> {
        self.field_order.iter().map(String::as_str).collect()
    }

    /// Remove a field from the registry and from every profile using it.
    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        let field = self.fields.remove(name)?;
        self.field_order.retain(|n| n != name);
        for profile in self.profiles.values_mut() {
            if profile.remove_field(name).is_some() {
                log::info!(
                    "Removed field '{}' from profile '{}'",
                    name,
                    profile.name()
                );
            }
        }
        log::info!("Removed field '{}'", name);
        Some(field)
    }

    /// Replace a field's payload. The kind cannot change.
    pub fn set_field_value(&mut self, name: &str, payload: impl Into<Value>) -> Result<()> {
        let payload = payload.into();
        self.update_field(name, |field| field.set_value(&payload))
    }

    /// Set or clear a field's default.
    pub fn set_field_default(&mut self, name: &str, default: Option<Value>) -> Result<()> {
        self.update_field(name, |field| field.set_default(default.as_ref()))
    }

    /// Change an integer field's padding.
    pub fn set_field_padding(&mut self, name: &str, padding: usize) -> Result<()> {
        self.update_field(name, |field| field.set_padding(padding))
    }

    /// Apply `change` to a copy of the field; on success store it and
    /// refresh every profile's copy.
    fn update_field<F>(&mut self, name: &str, change: F) -> Result<()>
    where
        F: FnOnce(&mut Field) -> Result<()>,
    {
        let mut field = self
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| NamingError::UnknownField(name.to_string()))?;
        change(&mut field)?;

        for profile in self.profiles.values_mut() {
            profile.replace_field(&field);
        }
        self.fields.insert(name.to_string(), field);
        log::debug!("Updated field '{}'", name);
        Ok(())
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Register a profile built from already-registered fields.
    ///
    /// The profile becomes active when `active` is set or when no profile
    /// is active yet.
    pub fn add_profile(&mut self, name: &str, fields: &[&str], active: bool) -> Result<&Profile> {
        if self.profiles.contains_key(name) {
            return Err(NamingError::DuplicateProfile(name.to_string()));
        }

        let mut profile = Profile::new(name);
        for field_name in fields {
            let field = self
                .fields
                .get(*field_name)
                .ok_or_else(|| NamingError::UnknownField((*field_name).to_string()))?;
            profile.push_field(field.clone())?;
        }

        self.profile_order.push(name.to_string());
        if active || self.active.is_none() {
            log::info!("Profile '{}' is now active", name);
            self.active = Some(name.to_string());
        }
        log::info!(
            "Registered profile '{}' with {} fields",
            name,
            profile.len()
        );
        Ok(self.profiles.entry(name.to_string()).or_insert(profile))
    }

    /// Append a registered field to a profile.
    pub fn append_field(&mut self, profile: &str, field: &str) -> Result<()> {
        let field = self
            .fields
            .get(field)
            .cloned()
            .ok_or_else(|| NamingError::UnknownField(field.to_string()))?;
        self.profiles
            .get_mut(profile)
            .ok_or_else(|| NamingError::UnknownProfile(profile.to_string()))?
            .push_field(field)
    }

    /// Change a profile's separator.
    pub fn set_separator(&mut self, profile: &str, separator: &str) -> Result<()> {
        self.profiles
            .get_mut(profile)
            .ok_or_else(|| NamingError::UnknownProfile(profile.to_string()))?
            .set_separator(separator)
    }

    /// Get a profile by name
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// All profiles in registration order
    pub fn profiles(&self) -> Vec<&Profile> {
        self.profile_order
            .iter()
            .filter_map(|name| self.profiles.get(name))
            .collect()
    }

    /// Profile names in registration order
    pub fn profile_names(&self) -> Vec<&str> {
        self.profile_order.iter().map(String::as_str).collect()
    }

    /// Remove a profile.
    ///
    /// Removing the active profile activates the first remaining profile in
    /// registration order, or clears the active profile if none remain.
    pub fn delete_profile(&mut self, name: &str) -> Option<Profile> {
        let profile = self.profiles.remove(name)?;
        self.profile_order.retain(|n| n != name);
        log::info!("Deleted profile '{}'", name);

        if self.active.as_deref() == Some(name) {
            self.active = self.profile_order.first().cloned();
            match &self.active {
                Some(next) => log::info!("Profile '{}' is now active", next),
                None => log::info!("No profiles remain; active profile cleared"),
            }
        }
        Some(profile)
    }

    // ========================================================================
    // Active profile
    // ========================================================================

    /// Make `name` the active profile. Unknown names leave the current
    /// active profile in place.
    pub fn set_active_profile(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            log::warn!("Cannot activate unknown profile '{}'", name);
            return Err(NamingError::UnknownProfile(name.to_string()));
        }
        self.active = Some(name.to_string());
        log::info!("Profile '{}' is now active", name);
        Ok(())
    }

    /// The active profile, if one is set
    pub fn active_profile(&self) -> Option<&Profile> {
        self.active
            .as_deref()
            .and_then(|name| self.profiles.get(name))
    }

    /// Name of the active profile, if one is set
    pub fn active_profile_name(&self) -> Option<&str> {
        self.active_profile().map(Profile::name)
    }

    /// Compose a name with the active profile.
    pub fn solve(&self, values: &[Value], named: &[(&str, Value)]) -> Result<String> {
        self.active_profile()
            .ok_or(NamingError::NoActiveProfile)?
            .solve(values, named)
    }

    /// Decompose a name with the active profile.
    pub fn unsolve(&self, name: &str) -> Result<Decomposed> {
        self.active_profile()
            .ok_or(NamingError::NoActiveProfile)?
            .unsolve(name)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Select the persistence driver.
    ///
    /// `None` selects the JSON file driver at the default path, keeping the
    /// current driver if it already is a JSON driver.
    pub fn set_driver(&mut self, driver: Option<Box<dyn Driver>>) {
        let driver = match driver {
            Some(driver) => driver,
            None => {
                if self
                    .driver
                    .as_ref()
                    .is_some_and(|current| current.kind() == DriverKind::Json)
                {
                    log::debug!("JSON driver already selected");
                    return;
                }
                Box::new(JsonDriver::new())
            }
        };
        log::info!("Using {} driver", driver.kind().display_name());
        self.driver = Some(driver);
    }

    /// The current driver, if any
    pub fn driver(&self) -> Option<&dyn Driver> {
        self.driver.as_deref()
    }

    /// Persist the registry through the current driver.
    pub fn save(&mut self) -> Result<()> {
        let state = self.to_state();
        let Some(driver) = self.driver.as_mut() else {
            log::error!("Refusing to save naming state: no driver configured");
            return Err(NamingError::NoDriver);
        };
        driver.save(&state)?;
        Ok(())
    }

    /// Replace the registry contents with the driver's saved state.
    ///
    /// On any error the registry is left as it was.
    pub fn load(&mut self) -> Result<()> {
        let Some(driver) = self.driver.as_mut() else {
            log::error!("Refusing to load naming state: no driver configured");
            return Err(NamingError::NoDriver);
        };
        let state = driver.load()?;
        self.restore(state)
    }

    /// Snapshot of the registry contents.
    pub fn to_state(&self) -> RegistryState {
        RegistryState {
            fields: self
                .field_order
                .iter()
                .enumerate()
                .filter_map(|(order, name)| {
                    self.fields
                        .get(name)
                        .map(|field| (name.clone(), field.to_record(order)))
                })
                .collect(),
            profiles: self
                .profile_order
                .iter()
                .enumerate()
                .filter_map(|(order, name)| {
                    self.profiles
                        .get(name)
                        .map(|profile| (name.clone(), profile.to_record(order)))
                })
                .collect(),
            active_profile: self.active.clone(),
        }
    }

    /// Replace the registry contents with `state`. The driver is kept.
    ///
    /// An active profile that names no profile is cleared.
    pub fn restore(&mut self, state: RegistryState) -> Result<()> {
        state.validate()?;

        let mut fields = HashMap::new();
        let mut field_order = Vec::new();
        for (name, record) in state.fields_ordered() {
            fields.insert(name.clone(), Field::from_record(name.as_str(), record)?);
            field_order.push(name.clone());
        }

        let mut profiles = HashMap::new();
        let mut profile_order = Vec::new();
        for (name, record) in state.profiles_ordered() {
            let mut profile = Profile::new(name.as_str()).with_separator(record.separator.as_str())?;
            for field_name in &record.fields {
                let field = fields
                    .get(field_name)
                    .ok_or_else(|| NamingError::UnknownField(field_name.clone()))?;
                profile.push_field(field.clone())?;
            }
            profiles.insert(name.clone(), profile);
            profile_order.push(name.clone());
        }

        let active = match state.active_profile {
            Some(name) if profiles.contains_key(&name) => Some(name),
            Some(name) => {
                log::warn!(
                    "Active profile '{}' does not exist; clearing active profile",
                    name
                );
                None
            }
            None => None,
        };

        self.fields = fields;
        self.field_order = field_order;
        self.profiles = profiles;
        self.profile_order = profile_order;
        self.active = active;
        log::debug!(
            "Restored {} fields and {} profiles",
            self.fields.len(),
            self.profiles.len()
        );
        Ok(())
    }
}
