//! Ordered overlay pipeline around a serializer
//!
//! A [`Pipeline`] wraps any [`Serializer`]. Inbound, every [`PayloadStage`]
//! runs in insertion order before the wrapped serializer validates the
//! payload. Outbound, every [`RepresentationStage`] runs in insertion order
//! on the representation the wrapped serializer produced.

use reinhardt_serializers::{
	InternalValue, Model, Payload, Representation, Result, Serializer, SerializerContext,
};

/// Transformation applied to inbound payloads before validation
pub trait PayloadStage: Send + Sync {
	fn name(&self) -> &str;

	fn apply(&self, payload: &mut Payload, context: &SerializerContext) -> Result<()>;
}

/// Transformation applied to outbound representations
pub trait RepresentationStage: Send + Sync {
	fn name(&self) -> &str;

	fn apply(
		&self,
		representation: &mut Representation,
		instance: &dyn Model,
		context: &SerializerContext,
	) -> Result<()>;
}

/// A serializer wrapped in explicit, ordered overlay stages
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use reinhardt_overlays::{Pipeline, RemoveFieldsOnCreation, WithHash};
/// use reinhardt_serializers::{
///     ModelFieldMeta, ModelMeta, ModelSerializer, Payload, Record, Serializer, SerializerContext,
/// };
///
/// let note = Arc::new(
///     ModelMeta::new("Note")
///         .with_field(ModelFieldMeta::new("id").pk())
///         .with_field(ModelFieldMeta::new("body"))
///         .with_field(ModelFieldMeta::new("pinned").blank()),
/// );
/// let pipeline = Pipeline::new(
///     ModelSerializer::new(note.clone())
///         .with_field("id")
///         .with_field("body")
///         .with_field("pinned"),
/// )
/// .with_payload_stage(RemoveFieldsOnCreation::new(vec!["pinned".to_string()]))
/// .with_representation_stage(WithHash::new());
///
/// let context = SerializerContext::new();
/// let repr = pipeline
///     .to_representation(&Record::new(note).with_value("id", 1).with_value("body", "hi"), &context)
///     .unwrap();
/// assert!(repr.contains_key("hash"));
///
/// let payload = Payload::from_value(json!({"body": "hi", "pinned": true})).unwrap();
/// let validated = pipeline.to_internal_value(payload, &context).unwrap();
/// assert_eq!(validated.into_value(), json!({"body": "hi"}));
/// ```
pub struct Pipeline<S> {
	inner: S,
	payload_stages: Vec<Box<dyn PayloadStage>>,
	representation_stages: Vec<Box<dyn RepresentationStage>>,
}

impl<S: Serializer> Pipeline<S> {
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			payload_stages: Vec::new(),
			representation_stages: Vec::new(),
		}
	}

	/// Append an inbound stage; it runs after the stages already added
	pub fn with_payload_stage(mut self, stage: impl PayloadStage + 'static) -> Self {
		self.payload_stages.push(Box::new(stage));
		self
	}

	/// Append an outbound stage; it runs after the stages already added
	pub fn with_representation_stage(mut self, stage: impl RepresentationStage + 'static) -> Self {
		self.representation_stages.push(Box::new(stage));
		self
	}

	pub fn inner(&self) -> &S {
		&self.inner
	}

	/// Names of the inbound stages in execution order
	pub fn payload_stage_names(&self) -> Vec<&str> {
		self.payload_stages.iter().map(|stage| stage.name()).collect()
	}

	/// Names of the outbound stages in execution order
	pub fn representation_stage_names(&self) -> Vec<&str> {
		self.representation_stages
			.iter()
			.map(|stage| stage.name())
			.collect()
	}
}

impl<S: Serializer> Serializer for Pipeline<S> {
	fn to_representation(
		&self,
		instance: &dyn Model,
		context: &SerializerContext,
	) -> Result<Representation> {
		let mut representation = self.inner.to_representation(instance, context)?;
		for stage in &self.representation_stages {
			tracing::trace!(stage = stage.name(), "Applying representation stage");
			stage.apply(&mut representation, instance, context)?;
		}
		Ok(representation)
	}

	fn to_internal_value(
		&self,
		mut payload: Payload,
		context: &SerializerContext,
	) -> Result<InternalValue> {
		for stage in &self.payload_stages {
			tracing::trace!(
				stage = stage.name(),
				mappings = payload.len(),
				"Applying payload stage"
			);
			stage.apply(&mut payload, context)?;
		}
		self.inner.to_internal_value(payload, context)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_serializers::{ModelFieldMeta, ModelMeta, Record, SerializerError};
	use rstest::{fixture, rstest};
	use serde_json::{Value, json};
	use std::sync::{Arc, Mutex};

	struct Echo;

	impl Serializer for Echo {
		fn to_representation(
			&self,
			instance: &dyn Model,
			_context: &SerializerContext,
		) -> Result<Representation> {
			let mut repr = Representation::new();
			repr.insert("id".to_string(), instance.pk().unwrap_or(Value::Null));
			Ok(repr)
		}

		fn to_internal_value(
			&self,
			payload: Payload,
			_context: &SerializerContext,
		) -> Result<InternalValue> {
			match payload {
				Payload::Single(map) => Ok(InternalValue::Single(map)),
				Payload::Many(items) => Ok(InternalValue::Many(items)),
			}
		}
	}

	struct Tag {
		label: &'static str,
		log: Arc<Mutex<Vec<&'static str>>>,
	}

	impl PayloadStage for Tag {
		fn name(&self) -> &str {
			self.label
		}

		fn apply(&self, payload: &mut Payload, _context: &SerializerContext) -> Result<()> {
			self.log.lock().unwrap().push(self.label);
			for mapping in payload.mappings_mut() {
				mapping.insert("last".to_string(), json!(self.label));
			}
			Ok(())
		}
	}

	impl RepresentationStage for Tag {
		fn name(&self) -> &str {
			self.label
		}

		fn apply(
			&self,
			representation: &mut Representation,
			_instance: &dyn Model,
			_context: &SerializerContext,
		) -> Result<()> {
			self.log.lock().unwrap().push(self.label);
			representation.insert("last".to_string(), json!(self.label));
			Ok(())
		}
	}

	struct Fail;

	impl PayloadStage for Fail {
		fn name(&self) -> &str {
			"fail"
		}

		fn apply(&self, _payload: &mut Payload, _context: &SerializerContext) -> Result<()> {
			Err(SerializerError::missing_context("request"))
		}
	}

	#[fixture]
	fn log() -> Arc<Mutex<Vec<&'static str>>> {
		Arc::new(Mutex::new(Vec::new()))
	}

	fn tag(label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Tag {
		Tag {
			label,
			log: Arc::clone(log),
		}
	}

	#[rstest]
	fn test_payload_stages_run_in_order(log: Arc<Mutex<Vec<&'static str>>>) {
		let pipeline = Pipeline::new(Echo)
			.with_payload_stage(tag("first", &log))
			.with_payload_stage(tag("second", &log));

		let value = pipeline
			.to_internal_value(
				Payload::from_value(json!({"title": "a"})).unwrap(),
				&SerializerContext::new(),
			)
			.unwrap();

		assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
		assert_eq!(pipeline.payload_stage_names(), vec!["first", "second"]);
		assert_eq!(value.into_value(), json!({"title": "a", "last": "second"}));
	}

	#[rstest]
	fn test_representation_stages_run_in_order(log: Arc<Mutex<Vec<&'static str>>>) {
		let meta = Arc::new(ModelMeta::new("Note").with_field(ModelFieldMeta::new("id").pk()));
		let pipeline = Pipeline::new(Echo)
			.with_representation_stage(tag("one", &log))
			.with_representation_stage(tag("two", &log));

		let repr = pipeline
			.to_representation(
				&Record::new(meta).with_value("id", 4),
				&SerializerContext::new(),
			)
			.unwrap();

		assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
		assert_eq!(pipeline.representation_stage_names(), vec!["one", "two"]);
		assert_eq!(Value::Object(repr), json!({"id": 4, "last": "two"}));
	}

	#[rstest]
	fn test_failing_stage_stops_conversion(log: Arc<Mutex<Vec<&'static str>>>) {
		let pipeline = Pipeline::new(Echo)
			.with_payload_stage(Fail)
			.with_payload_stage(tag("never", &log));

		let err = pipeline
			.to_internal_value(
				Payload::from_value(json!({})).unwrap(),
				&SerializerContext::new(),
			)
			.unwrap_err();

		assert_eq!(err, SerializerError::missing_context("request"));
		assert!(log.lock().unwrap().is_empty());
	}
}
