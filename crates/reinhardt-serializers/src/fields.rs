//! Relational field classes
//!
//! A [`FieldClass`] is a named factory that turns [`RelationKwargs`] into a
//! [`RelatedField`]. Field instances convert related objects to their wire
//! form and validate inbound references.
//!
//! Built-in classes:
//!
//! - [`PrimaryKeyRelatedField`]: `{"owner": 7}`
//! - [`SlugRelatedField`]: `{"category": "electronics"}`
//! - [`HyperlinkedRelatedField`]: `{"author": "/api/authors/42/"}`
//! - [`StringRelatedField`]: `{"author": "Author object (42)"}` (read-only)
//! - [`NestedRelatedField`]: `{"owner": {"id": 3, "name": "Ada"}}` (read-only)

use crate::context::SerializerContext;
use crate::error::{FieldError, Result, SerializerError};
use crate::model::Model;
use crate::relations::RelationKwargs;
use crate::serializer::Serializer;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Options shared by every relational field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
	pub many: bool,
	pub read_only: bool,
	pub required: bool,
	pub allow_null: bool,
}

impl FieldOptions {
	pub fn from_kwargs(kwargs: &RelationKwargs) -> Self {
		Self {
			many: kwargs.many,
			read_only: kwargs.read_only,
			required: kwargs.is_required(),
			allow_null: kwargs.allow_null,
		}
	}

	fn read_only() -> Self {
		Self {
			many: false,
			read_only: true,
			required: false,
			allow_null: false,
		}
	}
}

/// A constructed relational field
pub trait RelatedField: Send + Sync {
	fn options(&self) -> &FieldOptions;

	fn is_read_only(&self) -> bool {
		self.options().read_only
	}

	/// Convert one related object into its wire form
	fn to_representation(
		&self,
		related: &dyn Model,
		context: &SerializerContext,
	) -> Result<Value>;

	/// Validate one inbound reference
	fn to_internal_value(&self, data: &Value) -> std::result::Result<Value, FieldError>;
}

/// Factory behind a [`FieldClass`]
pub trait RelatedFieldFactory: Send + Sync {
	fn name(&self) -> &str;

	/// Whether fields of this class serialize as URL references
	fn is_hyperlinked(&self) -> bool {
		false
	}

	fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>>;
}

/// A shareable relational field class
///
/// Classes compare equal when their names match.
#[derive(Clone)]
pub struct FieldClass(Arc<dyn RelatedFieldFactory>);

impl FieldClass {
	pub fn new(factory: impl RelatedFieldFactory + 'static) -> Self {
		Self(Arc::new(factory))
	}

	pub fn name(&self) -> &str {
		self.0.name()
	}

	pub fn is_hyperlinked(&self) -> bool {
		self.0.is_hyperlinked()
	}

	pub fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		self.0.build(kwargs)
	}
}

impl fmt::Debug for FieldClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FieldClass").field(&self.name()).finish()
	}
}

impl PartialEq for FieldClass {
	fn eq(&self, other: &Self) -> bool {
		self.name() == other.name()
	}
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "str",
		Value::Array(_) => "list",
		Value::Object(_) => "dict",
	}
}

/// Represents a relation by the related object's primary key
pub struct PrimaryKeyRelatedField {
	options: FieldOptions,
}

impl PrimaryKeyRelatedField {
	pub const NAME: &'static str = "PrimaryKeyRelatedField";

	/// The field class
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_serializers::{PrimaryKeyRelatedField, RelationKwargs};
	/// use serde_json::json;
	///
	/// let field = PrimaryKeyRelatedField::class().build(&RelationKwargs::default()).unwrap();
	/// assert_eq!(field.to_internal_value(&json!(7)).unwrap(), json!(7));
	/// assert!(field.to_internal_value(&json!({"id": 7})).is_err());
	/// ```
	pub fn class() -> FieldClass {
		FieldClass::new(PrimaryKeyFactory)
	}
}

struct PrimaryKeyFactory;

impl RelatedFieldFactory for PrimaryKeyFactory {
	fn name(&self) -> &str {
		PrimaryKeyRelatedField::NAME
	}

	fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		Ok(Box::new(PrimaryKeyRelatedField {
			options: FieldOptions::from_kwargs(kwargs),
		}))
	}
}

impl RelatedField for PrimaryKeyRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_representation(
		&self,
		related: &dyn Model,
		_context: &SerializerContext,
	) -> Result<Value> {
		Ok(related.pk().unwrap_or(Value::Null))
	}

	fn to_internal_value(&self, data: &Value) -> std::result::Result<Value, FieldError> {
		match data {
			Value::Number(_) | Value::String(_) => Ok(data.clone()),
			other => Err(FieldError::new(format!(
				"Incorrect type. Expected pk value, received {}.",
				json_type_name(other)
			))),
		}
	}
}

/// Represents a relation by a unique text field of the related object
pub struct SlugRelatedField {
	slug_field: String,
	options: FieldOptions,
}

impl SlugRelatedField {
	pub const NAME: &'static str = "SlugRelatedField";

	/// The field class; construction requires `slug_field`
	pub fn class() -> FieldClass {
		FieldClass::new(SlugFactory)
	}

	pub fn slug_field(&self) -> &str {
		&self.slug_field
	}
}

struct SlugFactory;

impl RelatedFieldFactory for SlugFactory {
	fn name(&self) -> &str {
		SlugRelatedField::NAME
	}

	fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		let slug_field = kwargs.slug_field.clone().ok_or_else(|| {
			SerializerError::configuration("SlugRelatedField requires a slug_field argument")
		})?;
		Ok(Box::new(SlugRelatedField {
			slug_field,
			options: FieldOptions::from_kwargs(kwargs),
		}))
	}
}

impl RelatedField for SlugRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_representation(
		&self,
		related: &dyn Model,
		_context: &SerializerContext,
	) -> Result<Value> {
		Ok(related.value(&self.slug_field).unwrap_or(Value::Null))
	}

	fn to_internal_value(&self, data: &Value) -> std::result::Result<Value, FieldError> {
		match data {
			Value::String(_) => Ok(data.clone()),
			_ => Err(FieldError::new("Invalid value.")),
		}
	}
}

/// URL reversal used by hyperlinked fields
///
/// Implement this on top of the router so serializers do not depend on it.
pub trait UrlReverser: Send + Sync {
	/// Reverse a route name to a path
	fn reverse(
		&self,
		name: &str,
		params: &HashMap<String, String>,
	) -> std::result::Result<String, String>;

	/// Resolve a path back to its route name and parameters
	fn resolve(&self, url: &str) -> Option<(String, HashMap<String, String>)>;
}

/// Represents a relation by the URL of the related object's detail view
pub struct HyperlinkedRelatedField {
	view_name: String,
	lookup_field: String,
	reverser: Arc<dyn UrlReverser>,
	options: FieldOptions,
}

impl HyperlinkedRelatedField {
	pub const NAME: &'static str = "HyperlinkedRelatedField";

	/// The field class, bound to a URL reverser; construction requires `view_name`
	pub fn class(reverser: Arc<dyn UrlReverser>) -> FieldClass {
		FieldClass::new(HyperlinkedFactory { reverser })
	}
}

struct HyperlinkedFactory {
	reverser: Arc<dyn UrlReverser>,
}

impl RelatedFieldFactory for HyperlinkedFactory {
	fn name(&self) -> &str {
		HyperlinkedRelatedField::NAME
	}

	fn is_hyperlinked(&self) -> bool {
		true
	}

	fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		let view_name = kwargs.view_name.clone().ok_or_else(|| {
			SerializerError::configuration("HyperlinkedRelatedField requires a view_name argument")
		})?;
		Ok(Box::new(HyperlinkedRelatedField {
			view_name,
			lookup_field: "pk".to_string(),
			reverser: Arc::clone(&self.reverser),
			options: FieldOptions::from_kwargs(kwargs),
		}))
	}
}

impl RelatedField for HyperlinkedRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_representation(
		&self,
		related: &dyn Model,
		_context: &SerializerContext,
	) -> Result<Value> {
		let pk = match related.pk() {
			Some(Value::String(pk)) => pk,
			Some(pk) => pk.to_string(),
			None => return Ok(Value::Null),
		};
		let params = HashMap::from([(self.lookup_field.clone(), pk)]);
		self.reverser
			.reverse(&self.view_name, &params)
			.map(Value::String)
			.map_err(|message| SerializerError::Url { message })
	}

	fn to_internal_value(&self, data: &Value) -> std::result::Result<Value, FieldError> {
		let url = data
			.as_str()
			.ok_or_else(|| FieldError::new("Incorrect type. Expected URL string."))?;
		let (view_name, params) = self
			.reverser
			.resolve(url)
			.ok_or_else(|| FieldError::new("Invalid hyperlink - No URL match."))?;
		if view_name != self.view_name {
			return Err(FieldError::new("Invalid hyperlink - Incorrect URL match."));
		}
		params
			.get(&self.lookup_field)
			.map(|pk| match pk.parse::<i64>() {
				Ok(pk) => Value::from(pk),
				Err(_) => Value::String(pk.clone()),
			})
			.ok_or_else(|| FieldError::new("Invalid hyperlink - Object does not exist."))
	}
}

/// Represents a relation by the related object's display label
pub struct StringRelatedField {
	options: FieldOptions,
}

impl StringRelatedField {
	pub const NAME: &'static str = "StringRelatedField";

	pub fn class() -> FieldClass {
		FieldClass::new(StringFactory)
	}
}

struct StringFactory;

impl RelatedFieldFactory for StringFactory {
	fn name(&self) -> &str {
		StringRelatedField::NAME
	}

	fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		let mut options = FieldOptions::read_only();
		options.many = kwargs.many;
		Ok(Box::new(StringRelatedField { options }))
	}
}

impl RelatedField for StringRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_representation(
		&self,
		related: &dyn Model,
		_context: &SerializerContext,
	) -> Result<Value> {
		Ok(Value::String(related.display()))
	}

	fn to_internal_value(&self, _data: &Value) -> std::result::Result<Value, FieldError> {
		Err(FieldError::new("This field is read-only."))
	}
}

/// Embeds the related object's full representation produced by a child serializer
pub struct NestedRelatedField {
	serializer: Arc<dyn Serializer>,
	options: FieldOptions,
}

impl NestedRelatedField {
	/// A named class embedding the output of `serializer`
	///
	/// The name is what configuration refers to, e.g. `ExpandedOwnerField`.
	pub fn class(name: impl Into<String>, serializer: Arc<dyn Serializer>) -> FieldClass {
		FieldClass::new(NestedFactory {
			name: name.into(),
			serializer,
		})
	}
}

struct NestedFactory {
	name: String,
	serializer: Arc<dyn Serializer>,
}

impl RelatedFieldFactory for NestedFactory {
	fn name(&self) -> &str {
		&self.name
	}

	fn build(&self, _kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		Ok(Box::new(NestedRelatedField {
			serializer: Arc::clone(&self.serializer),
			options: FieldOptions::read_only(),
		}))
	}
}

impl RelatedField for NestedRelatedField {
	fn options(&self) -> &FieldOptions {
		&self.options
	}

	fn to_representation(&self, related: &dyn Model, context: &SerializerContext) -> Result<Value> {
		self.serializer
			.to_representation(related, context)
			.map(Value::Object)
	}

	fn to_internal_value(&self, _data: &Value) -> std::result::Result<Value, FieldError> {
		Err(FieldError::new("Nested writes are not supported."))
	}
}
