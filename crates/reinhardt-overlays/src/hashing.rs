//! Content hash overlay for outbound representations

use crate::hasher::ContentHasher;
use crate::pipeline::RepresentationStage;
use reinhardt_serializers::{Model, Representation, Result, SerializerContext};
use serde_json::Value;

/// Default key the digest is stored under
pub const DEFAULT_HASH_KEY: &str = "hash";

/// Appends a deterministic content hash to every representation
///
/// The digest covers the representation as produced by the stages before
/// this one. Any value already stored under the hash key is replaced and
/// does not take part in the digest. Changes made by later stages are not
/// reflected in it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use reinhardt_overlays::{RepresentationStage, WithHash};
/// use reinhardt_serializers::{ModelFieldMeta, ModelMeta, Record, Representation, SerializerContext};
/// use serde_json::json;
///
/// let meta = Arc::new(ModelMeta::new("Note").with_field(ModelFieldMeta::new("id").pk()));
/// let instance = Record::new(meta);
///
/// let mut repr = Representation::new();
/// repr.insert("id".to_string(), json!(1));
/// WithHash::new()
///     .apply(&mut repr, &instance, &SerializerContext::new())
///     .unwrap();
///
/// assert_eq!(repr.len(), 2);
/// assert!(repr["hash"].is_string());
/// ```
#[derive(Debug, Clone)]
pub struct WithHash {
	key: String,
	hasher: ContentHasher,
}

impl Default for WithHash {
	fn default() -> Self {
		Self {
			key: DEFAULT_HASH_KEY.to_string(),
			hasher: ContentHasher::new(),
		}
	}
}

impl WithHash {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store the digest under `key` instead of `"hash"`
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();
		self
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Digest the representation would receive, ignoring the hash key
	pub fn digest(&self, representation: &Representation) -> String {
		if representation.contains_key(&self.key) {
			let mut content = representation.clone();
			content.shift_remove(&self.key);
			self.hasher.hash_map(&content)
		} else {
			self.hasher.hash_map(representation)
		}
	}
}

impl RepresentationStage for WithHash {
	fn name(&self) -> &str {
		"with_hash"
	}

	fn apply(
		&self,
		representation: &mut Representation,
		instance: &dyn Model,
		_context: &SerializerContext,
	) -> Result<()> {
		let digest = self.digest(representation);
		tracing::debug!(
			model = instance.model_meta().name(),
			key = %self.key,
			digest = %digest,
			"Attached content hash"
		);
		representation.insert(self.key.clone(), Value::String(digest));
		Ok(())
	}
}
