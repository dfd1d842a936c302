//! Model introspection contracts
//!
//! Serializers never see concrete model types. They work against
//! [`ModelMeta`], which describes a model's fields, and the object-safe
//! [`Model`] trait, which exposes an instance's values and related objects.
//! [`Record`] is a dynamic instance for callers without a typed model.

use crate::error::{Result, SerializerError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Description of a single model field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFieldMeta {
	pub name: String,
	pub primary_key: bool,
	pub unique: bool,
	pub null: bool,
	pub blank: bool,
	pub editable: bool,
	pub verbose_name: Option<String>,
}

impl ModelFieldMeta {
	/// Create an editable, non-null field
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_serializers::ModelFieldMeta;
	///
	/// let field = ModelFieldMeta::new("slug").unique();
	/// assert!(field.unique);
	/// assert!(field.editable);
	/// assert!(!field.primary_key);
	/// ```
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			primary_key: false,
			unique: false,
			null: false,
			blank: false,
			editable: true,
			verbose_name: None,
		}
	}

	/// Mark the field as the primary key (implies unique)
	pub fn pk(mut self) -> Self {
		self.primary_key = true;
		self.unique = true;
		self
	}

	pub fn unique(mut self) -> Self {
		self.unique = true;
		self
	}

	pub fn nullable(mut self) -> Self {
		self.null = true;
		self
	}

	pub fn blank(mut self) -> Self {
		self.blank = true;
		self
	}

	pub fn non_editable(mut self) -> Self {
		self.editable = false;
		self
	}

	pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
		self.verbose_name = Some(name.into());
		self
	}
}

/// Model-level metadata: name plus field descriptions
///
/// # Examples
///
/// ```
/// use reinhardt_serializers::{ModelFieldMeta, ModelMeta};
///
/// let owner = ModelMeta::new("Owner")
///     .with_field(ModelFieldMeta::new("id").pk())
///     .with_field(ModelFieldMeta::new("name"));
///
/// assert_eq!(owner.pk().map(|f| f.name.as_str()), Some("id"));
/// assert_eq!(owner.detail_view_name(), "owner-detail");
/// assert!(owner.get_field("email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
	name: String,
	fields: Vec<ModelFieldMeta>,
}

impl ModelMeta {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	pub fn with_field(mut self, field: ModelFieldMeta) -> Self {
		self.fields.push(field);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn fields(&self) -> &[ModelFieldMeta] {
		&self.fields
	}

	/// Look up a field by name
	pub fn get_field(&self, name: &str) -> Result<&ModelFieldMeta> {
		self.fields
			.iter()
			.find(|field| field.name == name)
			.ok_or_else(|| SerializerError::UnknownField {
				model: self.name.clone(),
				field: name.to_string(),
			})
	}

	/// The primary key field, if one is declared
	pub fn pk(&self) -> Option<&ModelFieldMeta> {
		self.fields.iter().find(|field| field.primary_key)
	}

	/// Conventional detail route name, e.g. `owner-detail`
	pub fn detail_view_name(&self) -> String {
		format!("{}-detail", self.name.to_lowercase())
	}
}

/// Objects reachable through a relation on an instance
pub enum RelatedValue<'a> {
	Null,
	One(&'a dyn Model),
	Many(Vec<&'a dyn Model>),
}

/// A persisted domain object as seen by serializers
pub trait Model: Send + Sync {
	/// Metadata of the model this instance belongs to
	fn model_meta(&self) -> &ModelMeta;

	/// Value of a plain (non-relational) field
	fn value(&self, field: &str) -> Option<Value>;

	/// Objects behind a relational field
	fn related(&self, _field: &str) -> RelatedValue<'_> {
		RelatedValue::Null
	}

	/// Primary key value of this instance
	fn pk(&self) -> Option<Value> {
		let pk = self.model_meta().pk()?;
		self.value(&pk.name)
	}

	/// Human readable label, used by string-style relational fields
	fn display(&self) -> String {
		match self.pk() {
			Some(Value::String(pk)) => format!("{} object ({})", self.model_meta().name(), pk),
			Some(pk) => format!("{} object ({})", self.model_meta().name(), pk),
			None => format!("{} object (None)", self.model_meta().name()),
		}
	}
}

#[derive(Debug, Clone)]
enum RecordRelation {
	One(Box<Record>),
	Many(Vec<Record>),
}

/// Dynamic model instance backed by a JSON map
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use reinhardt_serializers::{Model, ModelFieldMeta, ModelMeta, Record};
///
/// let meta = Arc::new(
///     ModelMeta::new("Owner")
///         .with_field(ModelFieldMeta::new("id").pk())
///         .with_field(ModelFieldMeta::new("name")),
/// );
/// let owner = Record::new(meta).with_value("id", 3).with_value("name", "Ada");
///
/// assert_eq!(owner.pk(), Some(json!(3)));
/// assert_eq!(owner.display(), "Owner object (3)");
/// ```
#[derive(Debug, Clone)]
pub struct Record {
	meta: Arc<ModelMeta>,
	values: Map<String, Value>,
	related: HashMap<String, RecordRelation>,
}

impl Record {
	pub fn new(meta: Arc<ModelMeta>) -> Self {
		Self {
			meta,
			values: Map::new(),
			related: HashMap::new(),
		}
	}

	pub fn with_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(field.into(), value.into());
		self
	}

	pub fn with_related(mut self, field: impl Into<String>, related: Record) -> Self {
		self.related
			.insert(field.into(), RecordRelation::One(Box::new(related)));
		self
	}

	pub fn with_related_many(mut self, field: impl Into<String>, related: Vec<Record>) -> Self {
		self.related
			.insert(field.into(), RecordRelation::Many(related));
		self
	}
}

impl Model for Record {
	fn model_meta(&self) -> &ModelMeta {
		&self.meta
	}

	fn value(&self, field: &str) -> Option<Value> {
		self.values.get(field).cloned()
	}

	fn related(&self, field: &str) -> RelatedValue<'_> {
		match self.related.get(field) {
			Some(RecordRelation::One(record)) => RelatedValue::One(&**record),
			Some(RecordRelation::Many(records)) => {
				RelatedValue::Many(records.iter().map(|r| r as &dyn Model).collect())
			}
			None => RelatedValue::Null,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn tag_meta() -> Arc<ModelMeta> {
		Arc::new(
			ModelMeta::new("Tag")
				.with_field(ModelFieldMeta::new("slug").pk())
				.with_field(ModelFieldMeta::new("label").blank()),
		)
	}

	#[rstest]
	fn test_get_field_unknown(tag_meta: Arc<ModelMeta>) {
		let err = tag_meta.get_field("color").unwrap_err();
		assert_eq!(
			err,
			SerializerError::UnknownField {
				model: "Tag".to_string(),
				field: "color".to_string(),
			}
		);
	}

	#[rstest]
	fn test_string_pk_display(tag_meta: Arc<ModelMeta>) {
		let tag = Record::new(tag_meta).with_value("slug", "rust");
		assert_eq!(tag.pk(), Some(json!("rust")));
		assert_eq!(tag.display(), "Tag object (rust)");
	}

	#[rstest]
	fn test_record_related(tag_meta: Arc<ModelMeta>) {
		let a = Record::new(tag_meta.clone()).with_value("slug", "a");
		let b = Record::new(tag_meta.clone()).with_value("slug", "b");
		let post = Record::new(tag_meta.clone())
			.with_related("parent", a.clone())
			.with_related_many("children", vec![a, b]);

		assert!(matches!(post.related("parent"), RelatedValue::One(r) if r.pk() == Some(json!("a"))));
		match post.related("children") {
			RelatedValue::Many(items) => assert_eq!(items.len(), 2),
			_ => panic!("expected many"),
		}
		assert!(matches!(post.related("missing"), RelatedValue::Null));
	}
}
