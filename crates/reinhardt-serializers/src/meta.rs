//! Meta configuration for serializers
//!
//! Typed replacement for Django REST Framework's nested `Meta` class. Every
//! option has a documented default, so overlays never probe for presence at
//! runtime.

use crate::fields::FieldClass;
use std::collections::BTreeMap;

/// Configuration builder for serializers and the overlays attached to them
///
/// Defaults: all declared fields included, nothing excluded, no read-only or
/// write-only fields, no fields removed on creation, no read-time relation
/// overrides.
///
/// # Examples
///
/// ```
/// use reinhardt_serializers::{PrimaryKeyRelatedField, SerializerMeta};
///
/// let meta = SerializerMeta::new()
///     .with_fields(vec!["id".to_string(), "title".to_string(), "owner".to_string()])
///     .with_read_only_fields(vec!["id".to_string()])
///     .with_remove_fields_on_creation(vec!["id".to_string()])
///     .with_read_nested_field("owner", PrimaryKeyRelatedField::class());
///
/// assert!(meta.is_field_included("title"));
/// assert!(!meta.is_field_included("secret"));
/// assert!(meta.is_read_only("id"));
/// assert_eq!(meta.remove_fields_on_creation(), &["id".to_string()][..]);
/// assert!(meta.read_nested_field("owner").is_some());
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct SerializerMeta {
	fields: Option<Vec<String>>,
	exclude: Vec<String>,
	read_only_fields: Vec<String>,
	write_only_fields: Vec<String>,
	remove_fields_on_creation: Vec<String>,
	read_nested_fields: BTreeMap<String, FieldClass>,
}

impl SerializerMeta {
	pub fn new() -> Self {
		Self::default()
	}

	/// Specify which fields to include
	pub fn with_fields(mut self, fields: Vec<String>) -> Self {
		self.fields = Some(fields);
		self
	}

	/// Specify which fields to exclude
	pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
		self.exclude = exclude;
		self
	}

	pub fn with_read_only_fields(mut self, fields: Vec<String>) -> Self {
		self.read_only_fields = fields;
		self
	}

	pub fn with_write_only_fields(mut self, fields: Vec<String>) -> Self {
		self.write_only_fields = fields;
		self
	}

	/// Fields clients may never supply on creation
	///
	/// Read by the field-stripping overlay, not by the serializer itself.
	pub fn with_remove_fields_on_creation(mut self, fields: Vec<String>) -> Self {
		self.remove_fields_on_creation = fields;
		self
	}

	/// Use `class` for relation `field_name` when producing output
	///
	/// Only honoured when the serializer's relational field builder is the
	/// read-nested/write-flat overlay built from this meta.
	pub fn with_read_nested_field(mut self, field_name: impl Into<String>, class: FieldClass) -> Self {
		self.read_nested_fields.insert(field_name.into(), class);
		self
	}

	/// Replace all read-time relation overrides
	pub fn with_read_nested_fields(mut self, fields: BTreeMap<String, FieldClass>) -> Self {
		self.read_nested_fields = fields;
		self
	}

	/// Check if a field should be included in serialization
	pub fn is_field_included(&self, field_name: &str) -> bool {
		if self.exclude.iter().any(|f| f == field_name) {
			return false;
		}

		match &self.fields {
			Some(fields) => fields.iter().any(|f| f == field_name),
			None => true,
		}
	}

	pub fn is_read_only(&self, field_name: &str) -> bool {
		self.read_only_fields.iter().any(|f| f == field_name)
	}

	pub fn is_write_only(&self, field_name: &str) -> bool {
		self.write_only_fields.iter().any(|f| f == field_name)
	}

	pub fn fields(&self) -> Option<&Vec<String>> {
		self.fields.as_ref()
	}

	pub fn excluded_fields(&self) -> &[String] {
		&self.exclude
	}

	pub fn read_only_fields(&self) -> &[String] {
		&self.read_only_fields
	}

	pub fn write_only_fields(&self) -> &[String] {
		&self.write_only_fields
	}

	pub fn remove_fields_on_creation(&self) -> &[String] {
		&self.remove_fields_on_creation
	}

	pub fn read_nested_fields(&self) -> &BTreeMap<String, FieldClass> {
		&self.read_nested_fields
	}

	pub fn read_nested_field(&self, field_name: &str) -> Option<&FieldClass> {
		self.read_nested_fields.get(field_name)
	}
}
