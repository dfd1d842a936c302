//! File based overlay configuration
//!
//! Overlays can be configured from TOML instead of code:
//!
//! ```toml
//! [hash]
//! key = "hash"
//!
//! [attribution]
//! alias = "creator"
//! policy = "literal"
//!
//! [remove_fields_on_creation]
//! fields = ["id", "creator"]
//! scope = "top_level"
//!
//! [read_nested_fields]
//! owner = "ExpandedOwnerField"
//! ```
//!
//! Every section is optional. Missing sections mean no hashing, no
//! attribution, nothing stripped and no read-time overrides.

use crate::attribution::{AliasPolicy, CREATOR_FIELD, CreatorIsAuthenticatedUser};
use crate::hashing::{DEFAULT_HASH_KEY, WithHash};
use crate::nested::ReadNestedWriteFlat;
use crate::pipeline::Pipeline;
use crate::strip::{RemoveFieldsOnCreation, StripScope};
use reinhardt_serializers::{FieldClass, FieldRegistry, Serializer, SerializerMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or resolving overlay settings
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("Failed to parse overlay settings: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("Failed to read overlay settings from {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Relation '{relation}' refers to unknown field class '{class}'")]
	UnknownFieldClass { relation: String, class: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashSettings {
	pub key: String,
}

impl Default for HashSettings {
	fn default() -> Self {
		Self {
			key: DEFAULT_HASH_KEY.to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributionSettings {
	pub alias: String,
	pub policy: AliasPolicy,
}

impl Default for AttributionSettings {
	fn default() -> Self {
		Self {
			alias: CREATOR_FIELD.to_string(),
			policy: AliasPolicy::default(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoveFieldsSettings {
	pub fields: Vec<String>,
	pub scope: StripScope,
}

/// Overlay configuration for one serializer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlaySettings {
	pub hash: Option<HashSettings>,
	pub attribution: Option<AttributionSettings>,
	pub remove_fields_on_creation: RemoveFieldsSettings,
	/// Relation name to registered field class name
	pub read_nested_fields: BTreeMap<String, String>,
}

impl OverlaySettings {
	/// Parse settings from a TOML document
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_overlays::OverlaySettings;
	///
	/// let settings = OverlaySettings::from_toml_str(
	///     r#"
	///     [hash]
	///
	///     [remove_fields_on_creation]
	///     fields = ["id"]
	///     "#,
	/// )
	/// .unwrap();
	///
	/// assert_eq!(settings.hash.unwrap().key, "hash");
	/// assert!(settings.attribution.is_none());
	/// assert_eq!(settings.remove_fields_on_creation.fields, vec!["id".to_string()]);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Read and parse a TOML settings file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let settings = Self::from_toml_str(&source)?;
		tracing::debug!(path = %path.display(), "Loaded overlay settings");
		Ok(settings)
	}

	/// Resolve configured class names against a registry
	pub fn resolve_read_nested_fields(
		&self,
		registry: &FieldRegistry,
	) -> Result<BTreeMap<String, FieldClass>, SettingsError> {
		self.read_nested_fields
			.iter()
			.map(|(relation, class)| {
				registry
					.get(class)
					.cloned()
					.map(|resolved| (relation.clone(), resolved))
					.ok_or_else(|| SettingsError::UnknownFieldClass {
						relation: relation.clone(),
						class: class.clone(),
					})
			})
			.collect()
	}

	/// Merge these settings into a serializer's meta
	///
	/// Non-empty settings replace the corresponding meta options.
	pub fn apply_to_meta(
		&self,
		meta: SerializerMeta,
		registry: &FieldRegistry,
	) -> Result<SerializerMeta, SettingsError> {
		let mut meta = meta;
		if !self.remove_fields_on_creation.fields.is_empty() {
			meta = meta.with_remove_fields_on_creation(self.remove_fields_on_creation.fields.clone());
		}
		if !self.read_nested_fields.is_empty() {
			meta = meta.with_read_nested_fields(self.resolve_read_nested_fields(registry)?);
		}
		Ok(meta)
	}

	/// Relational field builder honouring `read_nested_fields`
	pub fn field_builder(&self, registry: &FieldRegistry) -> Result<ReadNestedWriteFlat, SettingsError> {
		let builder = self
			.resolve_read_nested_fields(registry)?
			.into_iter()
			.fold(ReadNestedWriteFlat::new(), |builder, (relation, class)| {
				builder.with_read_nested_field(relation, class)
			});
		Ok(builder)
	}

	/// Wrap `inner` in the configured stages
	///
	/// Inbound, stripping runs before attribution so a stripped `creator`
	/// is still set from the request afterwards.
	pub fn build_pipeline<S: Serializer>(&self, inner: S) -> Pipeline<S> {
		let mut pipeline = Pipeline::new(inner);

		if !self.remove_fields_on_creation.fields.is_empty() {
			pipeline = pipeline.with_payload_stage(
				RemoveFieldsOnCreation::new(self.remove_fields_on_creation.fields.clone())
					.with_scope(self.remove_fields_on_creation.scope),
			);
		}
		if let Some(attribution) = &self.attribution {
			pipeline = pipeline.with_payload_stage(
				CreatorIsAuthenticatedUser::new()
					.with_alias(attribution.alias.clone())
					.with_policy(attribution.policy),
			);
		}
		if let Some(hash) = &self.hash {
			pipeline = pipeline.with_representation_stage(WithHash::new().with_key(hash.key.clone()));
		}

		pipeline
	}
}
