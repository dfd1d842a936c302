//! Serializer trait and the model serializer
//!
//! [`ModelSerializer`] converts [`Model`] instances to ordered JSON maps and
//! validates inbound payloads. Relational fields are constructed per call
//! through a [`RelationalFieldBuilder`]. The builder receives the
//! [`ConversionMode`] explicitly, so one serializer can pick different field
//! classes for reading and writing without holding any mutable state.

use crate::context::SerializerContext;
use crate::error::{Result, SerializerError, ValidationErrors};
use crate::fields::{FieldClass, PrimaryKeyRelatedField, RelatedField, SlugRelatedField};
use crate::meta::SerializerMeta;
use crate::model::{Model, ModelMeta, RelatedValue};
use crate::relations::{RelationInfo, RelationKwargs, get_relation_kwargs};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Outbound wire-format mapping for one instance, in field declaration order
pub type Representation = Map<String, Value>;

/// Raw inbound data: one mapping or a bulk list of mappings
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	Single(Map<String, Value>),
	Many(Vec<Map<String, Value>>),
}

impl Payload {
	/// Accept a JSON object or an array of JSON objects
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_serializers::Payload;
	/// use serde_json::json;
	///
	/// assert!(!Payload::from_value(json!({"title": "a"})).unwrap().is_many());
	/// assert_eq!(Payload::from_value(json!([{"title": "a"}, {"title": "b"}])).unwrap().len(), 2);
	/// assert!(Payload::from_value(json!("title")).is_err());
	/// ```
	pub fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Object(map) => Ok(Payload::Single(map)),
			Value::Array(items) => items
				.into_iter()
				.enumerate()
				.map(|(index, item)| match item {
					Value::Object(map) => Ok(map),
					_ => Err(SerializerError::InvalidPayload {
						message: format!("Item {} is not an object", index),
					}),
				})
				.collect::<Result<Vec<_>>>()
				.map(Payload::Many),
			_ => Err(SerializerError::InvalidPayload {
				message: "Expected an object or a list of objects".to_string(),
			}),
		}
	}

	pub fn is_many(&self) -> bool {
		matches!(self, Payload::Many(_))
	}

	/// Number of mappings carried
	pub fn len(&self) -> usize {
		match self {
			Payload::Single(_) => 1,
			Payload::Many(items) => items.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Every mapping, whatever the payload shape
	pub fn mappings_mut(&mut self) -> Box<dyn Iterator<Item = &mut Map<String, Value>> + '_> {
		match self {
			Payload::Single(map) => Box::new(std::iter::once(map)),
			Payload::Many(items) => Box::new(items.iter_mut()),
		}
	}

	pub fn into_value(self) -> Value {
		match self {
			Payload::Single(map) => Value::Object(map),
			Payload::Many(items) => Value::Array(items.into_iter().map(Value::Object).collect()),
		}
	}
}

impl From<Map<String, Value>> for Payload {
	fn from(map: Map<String, Value>) -> Self {
		Payload::Single(map)
	}
}

/// Validated inbound data
#[derive(Debug, Clone, PartialEq)]
pub enum InternalValue {
	Single(Map<String, Value>),
	Many(Vec<Map<String, Value>>),
}

impl InternalValue {
	pub fn as_single(&self) -> Option<&Map<String, Value>> {
		match self {
			InternalValue::Single(map) => Some(map),
			InternalValue::Many(_) => None,
		}
	}

	pub fn as_many(&self) -> Option<&[Map<String, Value>]> {
		match self {
			InternalValue::Single(_) => None,
			InternalValue::Many(items) => Some(items),
		}
	}

	pub fn into_value(self) -> Value {
		match self {
			InternalValue::Single(map) => Value::Object(map),
			InternalValue::Many(items) => {
				Value::Array(items.into_iter().map(Value::Object).collect())
			}
		}
	}
}

/// Direction of the conversion a field is being constructed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
	/// Producing an outbound representation
	Read,
	/// Consuming an inbound payload
	Write,
}

impl ConversionMode {
	pub fn is_read(self) -> bool {
		self == ConversionMode::Read
	}
}

/// Conversion between model instances and wire data
pub trait Serializer: Send + Sync {
	/// Produce the outbound representation of one instance
	fn to_representation(
		&self,
		instance: &dyn Model,
		context: &SerializerContext,
	) -> Result<Representation>;

	/// Validate and coerce an inbound payload
	fn to_internal_value(
		&self,
		payload: Payload,
		context: &SerializerContext,
	) -> Result<InternalValue>;

	/// Produce representations for several instances
	fn to_representation_many(
		&self,
		instances: &[&dyn Model],
		context: &SerializerContext,
	) -> Result<Vec<Representation>> {
		instances
			.iter()
			.map(|instance| self.to_representation(*instance, context))
			.collect()
	}
}

/// Hook deciding which class and arguments a relational field is built with
pub trait RelationalFieldBuilder: Send + Sync {
	fn build_relational_field(
		&self,
		field_name: &str,
		relation_info: &RelationInfo,
		mode: ConversionMode,
	) -> Result<(FieldClass, RelationKwargs)>;
}

/// Standard relational field construction
///
/// Uses `related_field` (primary key by default), or `related_to_field`
/// (slug by default) when a forward relation targets a non primary key
/// field. `view_name` is dropped for classes that are not hyperlinked.
#[derive(Debug, Clone)]
pub struct DefaultRelationalFieldBuilder {
	related_field: FieldClass,
	related_to_field: FieldClass,
}

impl Default for DefaultRelationalFieldBuilder {
	fn default() -> Self {
		Self {
			related_field: PrimaryKeyRelatedField::class(),
			related_to_field: SlugRelatedField::class(),
		}
	}
}

impl DefaultRelationalFieldBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Class used for ordinary relations, e.g. a hyperlinked class
	pub fn with_related_field(mut self, class: FieldClass) -> Self {
		self.related_field = class;
		self
	}

	/// Class used when a forward relation targets a non primary key field
	pub fn with_related_to_field(mut self, class: FieldClass) -> Self {
		self.related_to_field = class;
		self
	}

	pub fn related_field(&self) -> &FieldClass {
		&self.related_field
	}

	pub fn related_to_field(&self) -> &FieldClass {
		&self.related_to_field
	}

	/// Default class and arguments, independent of the conversion mode
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use reinhardt_serializers::{
	///     DefaultRelationalFieldBuilder, ModelFieldMeta, ModelMeta, RelationInfo,
	/// };
	///
	/// let category = Arc::new(
	///     ModelMeta::new("Category")
	///         .with_field(ModelFieldMeta::new("id").pk())
	///         .with_field(ModelFieldMeta::new("slug").unique()),
	/// );
	/// let info = RelationInfo::forward(ModelFieldMeta::new("category"), category).to_field("slug");
	///
	/// let (class, kwargs) = DefaultRelationalFieldBuilder::new()
	///     .build_default("category", &info)
	///     .unwrap();
	/// assert_eq!(class.name(), "SlugRelatedField");
	/// assert_eq!(kwargs.slug_field.as_deref(), Some("slug"));
	/// assert_eq!(kwargs.view_name, None);
	/// ```
	pub fn build_default(
		&self,
		field_name: &str,
		relation_info: &RelationInfo,
	) -> Result<(FieldClass, RelationKwargs)> {
		let mut kwargs = get_relation_kwargs(field_name, relation_info);
		let mut class = self.related_field.clone();

		if let Some(to_field) = kwargs.to_field.take() {
			if !relation_info.reverse {
				let target = relation_info.related_model.get_field(&to_field)?;
				if !target.primary_key {
					kwargs.slug_field = Some(to_field);
					class = self.related_to_field.clone();
				}
			}
		}

		if !class.is_hyperlinked() {
			kwargs.view_name = None;
		}

		Ok((class, kwargs))
	}
}

impl RelationalFieldBuilder for DefaultRelationalFieldBuilder {
	fn build_relational_field(
		&self,
		field_name: &str,
		relation_info: &RelationInfo,
		_mode: ConversionMode,
	) -> Result<(FieldClass, RelationKwargs)> {
		self.build_default(field_name, relation_info)
	}
}

#[derive(Debug, Clone)]
enum DeclaredField {
	Plain(String),
	Relation { name: String, info: RelationInfo },
}

impl DeclaredField {
	fn name(&self) -> &str {
		match self {
			DeclaredField::Plain(name) => name,
			DeclaredField::Relation { name, .. } => name,
		}
	}
}

/// Serializer driven by model metadata and declared fields
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use reinhardt_serializers::{
///     ModelFieldMeta, ModelMeta, ModelSerializer, Payload, Record, RelationInfo, Serializer,
///     SerializerContext,
/// };
///
/// let owner = Arc::new(ModelMeta::new("Owner").with_field(ModelFieldMeta::new("id").pk()));
/// let item = Arc::new(
///     ModelMeta::new("Item")
///         .with_field(ModelFieldMeta::new("id").pk())
///         .with_field(ModelFieldMeta::new("title"))
///         .with_field(ModelFieldMeta::new("owner")),
/// );
///
/// let serializer = ModelSerializer::new(item.clone())
///     .with_field("id")
///     .with_field("title")
///     .with_relation("owner", RelationInfo::forward(ModelFieldMeta::new("owner"), owner.clone()));
///
/// let instance = Record::new(item)
///     .with_value("id", 1)
///     .with_value("title", "Lamp")
///     .with_related("owner", Record::new(owner).with_value("id", 7));
///
/// let context = SerializerContext::new();
/// let repr = serializer.to_representation(&instance, &context).unwrap();
/// assert_eq!(serde_json::Value::Object(repr), json!({"id": 1, "title": "Lamp", "owner": 7}));
///
/// let payload = Payload::from_value(json!({"title": "Desk", "owner": 7})).unwrap();
/// let validated = serializer.to_internal_value(payload, &context).unwrap();
/// assert_eq!(validated.into_value(), json!({"title": "Desk", "owner": 7}));
/// ```
#[derive(Clone)]
pub struct ModelSerializer {
	model: Arc<ModelMeta>,
	fields: Vec<DeclaredField>,
	meta: SerializerMeta,
	field_builder: Arc<dyn RelationalFieldBuilder>,
}

impl ModelSerializer {
	pub fn new(model: Arc<ModelMeta>) -> Self {
		Self {
			model,
			fields: Vec::new(),
			meta: SerializerMeta::default(),
			field_builder: Arc::new(DefaultRelationalFieldBuilder::default()),
		}
	}

	/// Declare a plain model field
	pub fn with_field(mut self, name: impl Into<String>) -> Self {
		self.fields.push(DeclaredField::Plain(name.into()));
		self
	}

	/// Declare a relational field
	pub fn with_relation(mut self, name: impl Into<String>, info: RelationInfo) -> Self {
		self.fields.push(DeclaredField::Relation {
			name: name.into(),
			info,
		});
		self
	}

	/// Replace the serializer options
	///
	/// `ModelSerializer` itself only reads the field selection and the
	/// read-only/write-only lists. `remove_fields_on_creation` and
	/// `read_nested_fields` take effect once the matching overlay is attached,
	/// e.g. `ReadNestedWriteFlat::attach` and `RemoveFieldsOnCreation::from_meta`
	/// in `reinhardt-overlays`.
	pub fn with_meta(mut self, meta: SerializerMeta) -> Self {
		self.meta = meta;
		self
	}

	/// Replace the hook that constructs relational fields
	pub fn with_field_builder(mut self, builder: Arc<dyn RelationalFieldBuilder>) -> Self {
		self.field_builder = builder;
		self
	}

	pub fn model(&self) -> &ModelMeta {
		&self.model
	}

	pub fn meta(&self) -> &SerializerMeta {
		&self.meta
	}

	/// Names of the declared fields left after `Meta` filtering
	pub fn field_names(&self) -> Vec<&str> {
		self.included_fields().map(DeclaredField::name).collect()
	}

	fn included_fields(&self) -> impl Iterator<Item = &DeclaredField> {
		self.fields
			.iter()
			.filter(|field| self.meta.is_field_included(field.name()))
	}

	fn build_field(
		&self,
		name: &str,
		info: &RelationInfo,
		mode: ConversionMode,
	) -> Result<Box<dyn RelatedField>> {
		let (class, kwargs) = self.field_builder.build_relational_field(name, info, mode)?;
		tracing::trace!(
			model = self.model.name(),
			field = name,
			class = class.name(),
			mode = ?mode,
			"Building relational field"
		);
		class.build(&kwargs)
	}

	fn validate_mapping(&self, data: &Map<String, Value>) -> Result<Map<String, Value>> {
		let mut errors = ValidationErrors::new();
		let mut validated = Map::new();

		for field in self.included_fields() {
			let name = field.name();
			if self.meta.is_read_only(name) {
				continue;
			}

			match field {
				DeclaredField::Plain(name) => {
					let model_field = self.model.get_field(name)?;
					if model_field.primary_key || !model_field.editable {
						continue;
					}
					match data.get(name) {
						Some(Value::Null) if !model_field.null => {
							errors.add(name.as_str(), "This field may not be null.");
						}
						Some(value) => {
							validated.insert(name.clone(), value.clone());
						}
						None if !model_field.blank && !model_field.null => {
							errors.add(name.as_str(), "This field is required.");
						}
						None => {}
					}
				}
				DeclaredField::Relation { name, info } => {
					let related = self.build_field(name, info, ConversionMode::Write)?;
					if related.is_read_only() {
						continue;
					}
					let options = related.options();
					match data.get(name) {
						None => {
							if options.required {
								errors.add(name.as_str(), "This field is required.");
							}
						}
						Some(Value::Null) => {
							if options.allow_null {
								validated.insert(name.clone(), Value::Null);
							} else {
								errors.add(name.as_str(), "This field may not be null.");
							}
						}
						Some(Value::Array(items)) if options.many => {
							let mut values = Vec::with_capacity(items.len());
							for item in items {
								match related.to_internal_value(item) {
									Ok(value) => values.push(value),
									Err(e) => errors.add(name.as_str(), e.message),
								}
							}
							validated.insert(name.clone(), Value::Array(values));
						}
						Some(_) if options.many => {
							errors.add(name.as_str(), "Expected a list of items.");
						}
						Some(value) => match related.to_internal_value(value) {
							Ok(value) => {
								validated.insert(name.clone(), value);
							}
							Err(e) => errors.add(name.as_str(), e.message),
						},
					}
				}
			}
		}

		errors.into_result(validated)
	}
}

impl Serializer for ModelSerializer {
	fn to_representation(
		&self,
		instance: &dyn Model,
		context: &SerializerContext,
	) -> Result<Representation> {
		let mut ret = Representation::new();

		for field in self.included_fields() {
			if self.meta.is_write_only(field.name()) {
				continue;
			}

			match field {
				DeclaredField::Plain(name) => {
					ret.insert(name.clone(), instance.value(name).unwrap_or(Value::Null));
				}
				DeclaredField::Relation { name, info } => {
					let related = self.build_field(name, info, ConversionMode::Read)?;
					let value = match instance.related(name) {
						RelatedValue::Null => Value::Null,
						RelatedValue::One(object) => related.to_representation(object, context)?,
						RelatedValue::Many(objects) => Value::Array(
							objects
								.into_iter()
								.map(|object| related.to_representation(object, context))
								.collect::<Result<Vec<_>>>()?,
						),
					};
					ret.insert(name.clone(), value);
				}
			}
		}

		Ok(ret)
	}

	fn to_internal_value(
		&self,
		payload: Payload,
		_context: &SerializerContext,
	) -> Result<InternalValue> {
		match payload {
			Payload::Single(data) => self.validate_mapping(&data).map(InternalValue::Single),
			Payload::Many(items) => {
				let mut validated = Vec::with_capacity(items.len());
				for (index, data) in items.iter().enumerate() {
					match self.validate_mapping(data) {
						Ok(value) => validated.push(value),
						Err(SerializerError::Validation(errors)) => {
							return Err(SerializerError::Validation(
								errors.prefixed(&format!("[{}]", index)),
							));
						}
						Err(e) => return Err(e),
					}
				}
				Ok(InternalValue::Many(validated))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fields::NestedRelatedField;
	use crate::model::{ModelFieldMeta, Record};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::sync::Mutex;

	struct Models {
		owner: Arc<ModelMeta>,
		tag: Arc<ModelMeta>,
		item: Arc<ModelMeta>,
	}

	#[fixture]
	fn models() -> Models {
		let owner = Arc::new(
			ModelMeta::new("Owner")
				.with_field(ModelFieldMeta::new("id").pk())
				.with_field(ModelFieldMeta::new("name"))
				.with_field(ModelFieldMeta::new("handle").unique()),
		);
		let tag = Arc::new(ModelMeta::new("Tag").with_field(ModelFieldMeta::new("id").pk()));
		let item = Arc::new(
			ModelMeta::new("Item")
				.with_field(ModelFieldMeta::new("id").pk())
				.with_field(ModelFieldMeta::new("title"))
				.with_field(ModelFieldMeta::new("notes").blank())
				.with_field(ModelFieldMeta::new("owner"))
				.with_field(ModelFieldMeta::new("tags")),
		);
		Models { owner, tag, item }
	}

	fn item_serializer(models: &Models) -> ModelSerializer {
		ModelSerializer::new(models.item.clone())
			.with_field("id")
			.with_field("title")
			.with_field("notes")
			.with_relation(
				"owner",
				RelationInfo::forward(ModelFieldMeta::new("owner"), models.owner.clone()),
			)
			.with_relation(
				"tags",
				RelationInfo::forward(ModelFieldMeta::new("tags").blank(), models.tag.clone())
					.many(),
			)
	}

	fn item(models: &Models) -> Record {
		Record::new(models.item.clone())
			.with_value("id", 1)
			.with_value("title", "Lamp")
			.with_value("notes", "")
			.with_related(
				"owner",
				Record::new(models.owner.clone())
					.with_value("id", 7)
					.with_value("name", "Ada")
					.with_value("handle", "ada"),
			)
			.with_related_many(
				"tags",
				vec![
					Record::new(models.tag.clone()).with_value("id", 1),
					Record::new(models.tag.clone()).with_value("id", 2),
				],
			)
	}

	#[rstest]
	fn test_to_representation_keeps_declaration_order(models: Models) {
		let repr = item_serializer(&models)
			.to_representation(&item(&models), &SerializerContext::new())
			.unwrap();

		assert_eq!(
			repr.keys().collect::<Vec<_>>(),
			vec!["id", "title", "notes", "owner", "tags"]
		);
		assert_eq!(repr["owner"], json!(7));
		assert_eq!(repr["tags"], json!([1, 2]));
	}

	#[rstest]
	fn test_to_representation_missing_relation_is_null(models: Models) {
		let instance = Record::new(models.item.clone()).with_value("title", "Bare");
		let repr = item_serializer(&models)
			.to_representation(&instance, &SerializerContext::new())
			.unwrap();

		assert_eq!(repr["owner"], Value::Null);
		assert_eq!(repr["id"], Value::Null);
	}

	#[rstest]
	fn test_meta_filters_fields(models: Models) {
		let serializer = item_serializer(&models).with_meta(
			SerializerMeta::new()
				.with_exclude(vec!["notes".to_string()])
				.with_write_only_fields(vec!["tags".to_string()]),
		);
		let repr = serializer
			.to_representation(&item(&models), &SerializerContext::new())
			.unwrap();

		assert_eq!(serializer.field_names(), vec!["id", "title", "owner", "tags"]);
		assert_eq!(repr.keys().collect::<Vec<_>>(), vec!["id", "title", "owner"]);
	}

	#[rstest]
	fn test_to_internal_value_drops_unknown_and_primary_key(models: Models) {
		let payload = Payload::from_value(json!({
			"id": 99,
			"title": "Desk",
			"owner": 7,
			"tags": [1, 2],
			"unexpected": true,
		}))
		.unwrap();
		let validated = item_serializer(&models)
			.to_internal_value(payload, &SerializerContext::new())
			.unwrap();

		assert_eq!(
			validated.into_value(),
			json!({"title": "Desk", "owner": 7, "tags": [1, 2]})
		);
	}

	#[rstest]
	fn test_to_internal_value_collects_errors(models: Models) {
		let payload = Payload::from_value(json!({"owner": {"id": 7}, "tags": 3})).unwrap();
		let err = item_serializer(&models)
			.to_internal_value(payload, &SerializerContext::new())
			.unwrap_err();
		let errors = err.as_validation_errors().unwrap();

		assert_eq!(
			errors.get("title"),
			Some(&["This field is required.".to_string()][..])
		);
		assert_eq!(
			errors.get("owner"),
			Some(&["Incorrect type. Expected pk value, received dict.".to_string()][..])
		);
		assert_eq!(
			errors.get("tags"),
			Some(&["Expected a list of items.".to_string()][..])
		);
		assert!(errors.get("notes").is_none());
	}

	#[rstest]
	fn test_null_relation(models: Models) {
		let payload = Payload::from_value(json!({"title": "Desk", "owner": null})).unwrap();
		let err = item_serializer(&models)
			.to_internal_value(payload, &SerializerContext::new())
			.unwrap_err();

		assert_eq!(
			err.as_validation_errors().unwrap().get("owner"),
			Some(&["This field may not be null.".to_string()][..])
		);
	}

	#[rstest]
	fn test_bulk_errors_are_indexed(models: Models) {
		let payload = Payload::from_value(json!([
			{"title": "Desk", "owner": 7},
			{"owner": 7},
		]))
		.unwrap();
		let err = item_serializer(&models)
			.to_internal_value(payload, &SerializerContext::new())
			.unwrap_err();

		assert!(err.as_validation_errors().unwrap().get("[1].title").is_some());
	}

	#[rstest]
	fn test_unknown_plain_field_fails(models: Models) {
		let serializer = ModelSerializer::new(models.item.clone()).with_field("color");
		let payload = Payload::from_value(json!({"color": "red"})).unwrap();

		let err = serializer
			.to_internal_value(payload, &SerializerContext::new())
			.unwrap_err();
		assert!(matches!(err, SerializerError::UnknownField { .. }));
	}

	#[rstest]
	fn test_slug_to_field(models: Models) {
		let serializer = ModelSerializer::new(models.item.clone()).with_relation(
			"owner",
			RelationInfo::forward(ModelFieldMeta::new("owner"), models.owner.clone())
				.to_field("handle"),
		);
		let repr = serializer
			.to_representation(&item(&models), &SerializerContext::new())
			.unwrap();

		assert_eq!(repr["owner"], json!("ada"));
	}

	#[rstest]
	#[case("id", "PrimaryKeyRelatedField")]
	#[case("handle", "SlugRelatedField")]
	fn test_default_builder_to_field(
		models: Models,
		#[case] to_field: &str,
		#[case] expected: &str,
	) {
		let info = RelationInfo::forward(ModelFieldMeta::new("owner"), models.owner.clone())
			.to_field(to_field);
		let (class, kwargs) = DefaultRelationalFieldBuilder::new()
			.build_default("owner", &info)
			.unwrap();

		assert_eq!(class.name(), expected);
		assert_eq!(kwargs.to_field, None);
		assert_eq!(kwargs.view_name, None);
	}

	#[rstest]
	fn test_default_builder_reverse_ignores_to_field(models: Models) {
		let info = RelationInfo::reverse(models.owner.clone()).to_field("handle");
		let (class, kwargs) = DefaultRelationalFieldBuilder::new()
			.build_default("owners", &info)
			.unwrap();

		assert_eq!(class.name(), "PrimaryKeyRelatedField");
		assert_eq!(kwargs.slug_field, None);
	}

	#[rstest]
	fn test_default_builder_unknown_to_field(models: Models) {
		let info = RelationInfo::forward(ModelFieldMeta::new("owner"), models.owner.clone())
			.to_field("missing");
		let err = DefaultRelationalFieldBuilder::new()
			.build_default("owner", &info)
			.unwrap_err();

		assert!(matches!(err, SerializerError::UnknownField { .. }));
	}

	struct RecordingBuilder {
		modes: Mutex<Vec<ConversionMode>>,
	}

	impl RelationalFieldBuilder for RecordingBuilder {
		fn build_relational_field(
			&self,
			field_name: &str,
			relation_info: &RelationInfo,
			mode: ConversionMode,
		) -> Result<(FieldClass, RelationKwargs)> {
			self.modes.lock().unwrap().push(mode);
			DefaultRelationalFieldBuilder::new().build_default(field_name, relation_info)
		}
	}

	#[rstest]
	fn test_mode_is_passed_to_builder(models: Models) {
		let builder = Arc::new(RecordingBuilder {
			modes: Mutex::new(Vec::new()),
		});
		let serializer = ModelSerializer::new(models.item.clone())
			.with_field("title")
			.with_relation(
				"owner",
				RelationInfo::forward(ModelFieldMeta::new("owner"), models.owner.clone()),
			)
			.with_field_builder(builder.clone());
		let context = SerializerContext::new();

		serializer
			.to_representation(&item(&models), &context)
			.unwrap();
		serializer
			.to_internal_value(
				Payload::from_value(json!({"title": "Desk", "owner": 7})).unwrap(),
				&context,
			)
			.unwrap();

		assert_eq!(
			*builder.modes.lock().unwrap(),
			vec![ConversionMode::Read, ConversionMode::Write]
		);
	}

	#[rstest]
	fn test_nested_field_class(models: Models) {
		let owner_serializer = ModelSerializer::new(models.owner.clone())
			.with_field("id")
			.with_field("name");
		let nested = NestedRelatedField::class("ExpandedOwnerField", Arc::new(owner_serializer));
		let serializer = ModelSerializer::new(models.item.clone())
			.with_relation(
				"owner",
				RelationInfo::forward(ModelFieldMeta::new("owner"), models.owner.clone()),
			)
			.with_field_builder(Arc::new(
				DefaultRelationalFieldBuilder::new().with_related_field(nested),
			));

		let repr = serializer
			.to_representation(&item(&models), &SerializerContext::new())
			.unwrap();
		assert_eq!(repr["owner"], json!({"id": 7, "name": "Ada"}));
	}

	#[rstest]
	fn test_to_representation_many(models: Models) {
		let first = item(&models);
		let second = Record::new(models.item.clone()).with_value("id", 2);
		let instances: Vec<&dyn Model> = vec![&first, &second];

		let reprs = item_serializer(&models)
			.to_representation_many(&instances, &SerializerContext::new())
			.unwrap();
		assert_eq!(reprs.len(), 2);
		assert_eq!(reprs[1]["id"], json!(2));
	}
}
