//! Field class registry
//!
//! Maps class names to [`FieldClass`] values so configuration loaded from
//! files can refer to relational field classes by name.

use crate::error::{Result, SerializerError};
use crate::fields::{FieldClass, PrimaryKeyRelatedField, SlugRelatedField, StringRelatedField};
use std::collections::HashMap;

/// Registry of relational field classes keyed by name
///
/// # Examples
///
/// ```
/// use reinhardt_serializers::FieldRegistry;
///
/// let registry = FieldRegistry::with_defaults();
/// assert!(registry.contains("PrimaryKeyRelatedField"));
/// assert_eq!(registry.is_hyperlinked("SlugRelatedField"), Some(false));
/// assert!(registry.resolve("ExpandedOwnerField").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
	classes: HashMap<String, FieldClass>,
}

impl FieldRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding the built-in classes that need no collaborators
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		registry.register(PrimaryKeyRelatedField::class());
		registry.register(SlugRelatedField::class());
		registry.register(StringRelatedField::class());
		registry
	}

	/// Register a class under its own name, replacing any previous entry
	pub fn register(&mut self, class: FieldClass) -> &mut Self {
		self.classes.insert(class.name().to_string(), class);
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.classes.contains_key(name)
	}

	pub fn get(&self, name: &str) -> Option<&FieldClass> {
		self.classes.get(name)
	}

	/// Look up a class, failing for unknown names
	pub fn resolve(&self, name: &str) -> Result<FieldClass> {
		self.get(name)
			.cloned()
			.ok_or_else(|| SerializerError::configuration(format!("Unknown field class '{}'", name)))
	}

	/// Hyperlink capability of a registered class
	pub fn is_hyperlinked(&self, name: &str) -> Option<bool> {
		self.get(name).map(FieldClass::is_hyperlinked)
	}
}
