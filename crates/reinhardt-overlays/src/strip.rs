//! Field stripping overlay for inbound payloads

use crate::pipeline::PayloadStage;
use reinhardt_serializers::{Payload, Result, SerializerContext, SerializerMeta};
use serde::{Deserialize, Serialize};

/// Which mappings of a payload are stripped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripScope {
	/// Strip single mappings only; bulk payloads pass through untouched
	#[default]
	TopLevel,
	/// Strip every mapping, including each item of a bulk payload
	EachItem,
}

/// Removes fields clients may not set from inbound payloads
///
/// Fields come from [`SerializerMeta::remove_fields_on_creation`]; the
/// default is empty, which makes the overlay a no-op. Keys that are absent
/// are ignored, so applying the overlay twice changes nothing.
///
/// # Examples
///
/// ```
/// use reinhardt_overlays::{PayloadStage, RemoveFieldsOnCreation};
/// use reinhardt_serializers::{Payload, SerializerContext, SerializerMeta};
/// use serde_json::json;
///
/// let meta = SerializerMeta::new()
///     .with_remove_fields_on_creation(vec!["id".to_string(), "created_at".to_string()]);
/// let stage = RemoveFieldsOnCreation::from_meta(&meta);
///
/// let mut payload = Payload::from_value(json!({"id": 9, "title": "Lamp"})).unwrap();
/// stage.apply(&mut payload, &SerializerContext::new()).unwrap();
/// assert_eq!(payload.into_value(), json!({"title": "Lamp"}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RemoveFieldsOnCreation {
	fields: Vec<String>,
	scope: StripScope,
}

impl RemoveFieldsOnCreation {
	pub fn new(fields: Vec<String>) -> Self {
		Self {
			fields,
			scope: StripScope::default(),
		}
	}

	pub fn from_meta(meta: &SerializerMeta) -> Self {
		Self::new(meta.remove_fields_on_creation().to_vec())
	}

	pub fn with_scope(mut self, scope: StripScope) -> Self {
		self.scope = scope;
		self
	}

	/// Names removed from inbound payloads
	pub fn remove_fields_on_creation(&self) -> &[String] {
		&self.fields
	}

	pub fn scope(&self) -> StripScope {
		self.scope
	}
}

impl PayloadStage for RemoveFieldsOnCreation {
	fn name(&self) -> &str {
		"remove_fields_on_creation"
	}

	fn apply(&self, payload: &mut Payload, _context: &SerializerContext) -> Result<()> {
		if self.fields.is_empty() {
			return Ok(());
		}
		if payload.is_many() && self.scope == StripScope::TopLevel {
			tracing::trace!(
				mappings = payload.len(),
				"Bulk payload passed through without stripping"
			);
			return Ok(());
		}

		let mut removed = 0usize;
		for mapping in payload.mappings_mut() {
			for field in &self.fields {
				if mapping.shift_remove(field).is_some() {
					removed += 1;
				}
			}
		}

		tracing::debug!(removed = removed, "Stripped fields on creation");
		Ok(())
	}
}
