//! Relation metadata and default relational field arguments
//!
//! [`RelationInfo`] describes a forward or reverse relation between models.
//! [`get_relation_kwargs`] turns it into the [`RelationKwargs`] a relational
//! field class is constructed with, following Django REST Framework's
//! `get_relation_kwargs` rules.

use crate::model::{ModelFieldMeta, ModelMeta};
use std::sync::Arc;

/// Description of a relational attribute on a model
#[derive(Debug, Clone)]
pub struct RelationInfo {
	/// Field on the source model; `None` for reverse relations
	pub model_field: Option<ModelFieldMeta>,
	/// Model the relation points at
	pub related_model: Arc<ModelMeta>,
	pub to_many: bool,
	/// Field on the related model used as lookup key, when not the primary key
	pub to_field: Option<String>,
	pub has_through_model: bool,
	pub reverse: bool,
}

impl RelationInfo {
	/// A forward relation declared by `model_field`
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use reinhardt_serializers::{ModelFieldMeta, ModelMeta, RelationInfo};
	///
	/// let owner = Arc::new(ModelMeta::new("Owner").with_field(ModelFieldMeta::new("id").pk()));
	/// let info = RelationInfo::forward(ModelFieldMeta::new("owner"), owner);
	///
	/// assert!(!info.reverse);
	/// assert!(!info.to_many);
	/// ```
	pub fn forward(model_field: ModelFieldMeta, related_model: Arc<ModelMeta>) -> Self {
		Self {
			model_field: Some(model_field),
			related_model,
			to_many: false,
			to_field: None,
			has_through_model: false,
			reverse: false,
		}
	}

	/// A reverse relation from `related_model` back to the serialized model
	pub fn reverse(related_model: Arc<ModelMeta>) -> Self {
		Self {
			model_field: None,
			related_model,
			to_many: false,
			to_field: None,
			has_through_model: false,
			reverse: true,
		}
	}

	pub fn many(mut self) -> Self {
		self.to_many = true;
		self
	}

	pub fn to_field(mut self, field: impl Into<String>) -> Self {
		self.to_field = Some(field.into());
		self
	}

	pub fn through_model(mut self) -> Self {
		self.has_through_model = true;
		self
	}
}

/// Construction arguments for a relational field class
///
/// An empty value (`RelationKwargs::default()`) means "construct with no
/// arguments"; every option then takes the field's own default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationKwargs {
	/// Name of the model related objects are looked up in
	pub queryset: Option<String>,
	pub view_name: Option<String>,
	pub to_field: Option<String>,
	pub slug_field: Option<String>,
	pub label: Option<String>,
	pub many: bool,
	pub read_only: bool,
	pub required: Option<bool>,
	pub allow_null: bool,
}

impl RelationKwargs {
	/// Whether no argument was set
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Effective `required` flag: explicit value, else required unless read-only
	pub fn is_required(&self) -> bool {
		self.required.unwrap_or(!self.read_only)
	}
}

/// Compute default construction arguments for a relational field
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use reinhardt_serializers::{get_relation_kwargs, ModelFieldMeta, ModelMeta, RelationInfo};
///
/// let owner = Arc::new(ModelMeta::new("Owner").with_field(ModelFieldMeta::new("id").pk()));
/// let info = RelationInfo::forward(ModelFieldMeta::new("owner").nullable(), owner);
///
/// let kwargs = get_relation_kwargs("owner", &info);
/// assert_eq!(kwargs.queryset.as_deref(), Some("Owner"));
/// assert_eq!(kwargs.view_name.as_deref(), Some("owner-detail"));
/// assert!(kwargs.allow_null);
/// assert!(!kwargs.is_required());
/// ```
pub fn get_relation_kwargs(field_name: &str, relation_info: &RelationInfo) -> RelationKwargs {
	let mut kwargs = RelationKwargs {
		queryset: Some(relation_info.related_model.name().to_string()),
		view_name: Some(relation_info.related_model.detail_view_name()),
		..Default::default()
	};

	if relation_info.to_many {
		kwargs.many = true;
	}
	if let Some(to_field) = &relation_info.to_field {
		kwargs.to_field = Some(to_field.clone());
	}
	if relation_info.has_through_model {
		kwargs.read_only = true;
		kwargs.queryset = None;
	}

	if let Some(model_field) = &relation_info.model_field {
		kwargs.label = model_field.verbose_name.clone();
		if !model_field.editable {
			kwargs.read_only = true;
			kwargs.queryset = None;
		}
		if !kwargs.read_only {
			if model_field.null {
				kwargs.allow_null = true;
			}
			if model_field.blank || model_field.null {
				kwargs.required = Some(false);
			}
		}
	}

	tracing::trace!(
		field = field_name,
		related_model = relation_info.related_model.name(),
		read_only = kwargs.read_only,
		many = kwargs.many,
		"Computed relation kwargs"
	);
	kwargs
}
