//! Read-nested, write-flat relation overlay
//!
//! Lets one serializer declaration emit an expanded object for a relation
//! when producing output while still accepting a flat reference (primary
//! key or slug) for the same relation on input.

use reinhardt_serializers::{
	ConversionMode, DefaultRelationalFieldBuilder, FieldClass, ModelSerializer, RelationInfo,
	RelationKwargs, RelationalFieldBuilder, Result, SerializerMeta,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Relational field builder that swaps in override classes on read
///
/// Field construction first follows [`DefaultRelationalFieldBuilder`]. Then,
/// only when the mode is [`ConversionMode::Read`] and the relation name has
/// an entry in `read_nested_fields`, the class is replaced by the override
/// and every computed argument is discarded.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use reinhardt_overlays::ReadNestedWriteFlat;
/// use reinhardt_serializers::{
///     ConversionMode, ModelFieldMeta, ModelMeta, RelationInfo, RelationalFieldBuilder,
///     StringRelatedField,
/// };
///
/// let owner = Arc::new(ModelMeta::new("Owner").with_field(ModelFieldMeta::new("id").pk()));
/// let info = RelationInfo::forward(ModelFieldMeta::new("owner"), owner);
/// let builder = ReadNestedWriteFlat::new().with_read_nested_field("owner", StringRelatedField::class());
///
/// let (read, read_kwargs) = builder
///     .build_relational_field("owner", &info, ConversionMode::Read)
///     .unwrap();
/// let (write, _) = builder
///     .build_relational_field("owner", &info, ConversionMode::Write)
///     .unwrap();
///
/// assert_eq!(read.name(), "StringRelatedField");
/// assert!(read_kwargs.is_empty());
/// assert_eq!(write.name(), "PrimaryKeyRelatedField");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadNestedWriteFlat {
	base: DefaultRelationalFieldBuilder,
	read_nested_fields: BTreeMap<String, FieldClass>,
}

impl ReadNestedWriteFlat {
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides taken from [`SerializerMeta::read_nested_fields`]
	pub fn from_meta(meta: &SerializerMeta) -> Self {
		Self {
			base: DefaultRelationalFieldBuilder::default(),
			read_nested_fields: meta.read_nested_fields().clone(),
		}
	}

	/// Install overrides from the serializer's own meta as its field builder
	///
	/// Replaces any field builder previously set on `serializer`.
	pub fn attach(serializer: ModelSerializer) -> ModelSerializer {
		let builder = Self::from_meta(serializer.meta());
		tracing::debug!(
			model = serializer.model().name(),
			overrides = builder.read_nested_fields.len(),
			"Attached read-nested field builder"
		);
		serializer.with_field_builder(Arc::new(builder))
	}

	/// Replace the builder producing the default class and arguments
	pub fn with_base(mut self, base: DefaultRelationalFieldBuilder) -> Self {
		self.base = base;
		self
	}

	pub fn with_read_nested_field(mut self, field_name: impl Into<String>, class: FieldClass) -> Self {
		self.read_nested_fields.insert(field_name.into(), class);
		self
	}

	pub fn read_nested_fields(&self) -> &BTreeMap<String, FieldClass> {
		&self.read_nested_fields
	}
}

impl RelationalFieldBuilder for ReadNestedWriteFlat {
	fn build_relational_field(
		&self,
		field_name: &str,
		relation_info: &RelationInfo,
		mode: ConversionMode,
	) -> Result<(FieldClass, RelationKwargs)> {
		let (class, kwargs) = self.base.build_default(field_name, relation_info)?;

		if mode.is_read() {
			if let Some(nested) = self.read_nested_fields.get(field_name) {
				tracing::debug!(
					field = field_name,
					default_class = class.name(),
					nested_class = nested.name(),
					"Using nested field class for read"
				);
				return Ok((nested.clone(), RelationKwargs::default()));
			}
		}

		Ok((class, kwargs))
	}
}
