//! Integration tests composing overlays around a model serializer

use reinhardt_overlays::{
	AliasPolicy, ContentHasher, CreatorIsAuthenticatedUser, OverlaySettings, Pipeline,
	ReadNestedWriteFlat, RemoveFieldsOnCreation, StripScope, WithHash,
};
use reinhardt_serializers::{
	AuthenticatedUser, FieldClass, FieldRegistry, ModelFieldMeta, ModelMeta, ModelSerializer,
	NestedRelatedField, Payload, Record, RelatedField, RelatedFieldFactory, RelationInfo,
	RelationKwargs, Request, Result, Serializer, SerializerContext, SerializerError, SerializerMeta,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a field class and counts how often it is instantiated
struct CountingFactory {
	inner: FieldClass,
	builds: Arc<AtomicUsize>,
}

impl RelatedFieldFactory for CountingFactory {
	fn name(&self) -> &str {
		self.inner.name()
	}

	fn build(&self, kwargs: &RelationKwargs) -> Result<Box<dyn RelatedField>> {
		self.builds.fetch_add(1, Ordering::SeqCst);
		self.inner.build(kwargs)
	}
}

fn owner_meta() -> Arc<ModelMeta> {
	Arc::new(
		ModelMeta::new("Owner")
			.with_field(ModelFieldMeta::new("id").pk())
			.with_field(ModelFieldMeta::new("name")),
	)
}

fn item_meta() -> Arc<ModelMeta> {
	Arc::new(
		ModelMeta::new("Item")
			.with_field(ModelFieldMeta::new("id").pk())
			.with_field(ModelFieldMeta::new("title"))
			.with_field(ModelFieldMeta::new("creator"))
			.with_field(ModelFieldMeta::new("owner")),
	)
}

fn owner_serializer() -> Arc<dyn Serializer> {
	Arc::new(
		ModelSerializer::new(owner_meta())
			.with_field("id")
			.with_field("name"),
	)
}

fn item_serializer() -> ModelSerializer {
	ModelSerializer::new(item_meta())
		.with_field("id")
		.with_field("title")
		.with_field("creator")
		.with_relation(
			"owner",
			RelationInfo::forward(ModelFieldMeta::new("owner"), owner_meta()),
		)
}

fn item() -> Record {
	Record::new(item_meta())
		.with_value("id", 1)
		.with_value("title", "Lamp")
		.with_value("creator", 42)
		.with_related(
			"owner",
			Record::new(owner_meta())
				.with_value("id", 7)
				.with_value("name", "Ada"),
		)
}

fn payload(value: Value) -> Payload {
	Payload::from_value(value).unwrap()
}

#[fixture]
fn alice() -> SerializerContext {
	SerializerContext::new().with_request(Request::authenticated(AuthenticatedUser::new(42, "alice")))
}

#[rstest]
fn test_owner_expanded_on_read_flat_on_write(alice: SerializerContext) {
	let builds = Arc::new(AtomicUsize::new(0));
	let expanded = FieldClass::new(CountingFactory {
		inner: NestedRelatedField::class("ExpandedOwnerField", owner_serializer()),
		builds: Arc::clone(&builds),
	});
	let serializer = item_serializer().with_field_builder(Arc::new(
		ReadNestedWriteFlat::new().with_read_nested_field("owner", expanded),
	));

	let validated = serializer
		.to_internal_value(payload(json!({"title": "Desk", "creator": 42, "owner": 7})), &alice)
		.unwrap();
	assert_eq!(
		validated.into_value(),
		json!({"title": "Desk", "creator": 42, "owner": 7})
	);
	assert_eq!(builds.load(Ordering::SeqCst), 0);

	let repr = serializer.to_representation(&item(), &alice).unwrap();
	assert_eq!(repr["owner"], json!({"id": 7, "name": "Ada"}));
	assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_nested_object_rejected_on_write(alice: SerializerContext) {
	let serializer = item_serializer().with_field_builder(Arc::new(
		ReadNestedWriteFlat::new().with_read_nested_field(
			"owner",
			NestedRelatedField::class("ExpandedOwnerField", owner_serializer()),
		),
	));

	let err = serializer
		.to_internal_value(
			payload(json!({"title": "Desk", "creator": 42, "owner": {"id": 7}})),
			&alice,
		)
		.unwrap_err();
	let errors = err.as_validation_errors().unwrap();

	assert_eq!(
		errors.get("owner").unwrap(),
		&["Incorrect type. Expected pk value, received dict.".to_string()][..]
	);
}

#[rstest]
fn test_creator_overwritten_single_and_bulk(alice: SerializerContext) {
	let pipeline = Pipeline::new(item_serializer())
		.with_payload_stage(CreatorIsAuthenticatedUser::new());

	let single = pipeline
		.to_internal_value(payload(json!({"title": "Lamp", "creator": 1, "owner": 7})), &alice)
		.unwrap();
	assert_eq!(single.as_single().unwrap()["creator"], json!(42));

	let bulk = pipeline
		.to_internal_value(
			payload(json!([
				{"title": "Lamp", "creator": 1, "owner": 7},
				{"title": "Desk", "owner": 7},
			])),
			&alice,
		)
		.unwrap();
	let items = bulk.as_many().unwrap();
	assert_eq!(items.len(), 2);
	assert!(items.iter().all(|item| item["creator"] == json!(42)));
}

#[rstest]
fn test_attribution_without_request_fails_before_validation() {
	let pipeline = Pipeline::new(item_serializer())
		.with_payload_stage(CreatorIsAuthenticatedUser::new());

	let err = pipeline
		.to_internal_value(payload(json!({"title": "Lamp"})), &SerializerContext::new())
		.unwrap_err();

	assert_eq!(err, SerializerError::missing_context("request"));
}

#[rstest]
fn test_bulk_validation_errors_are_indexed(alice: SerializerContext) {
	let pipeline = Pipeline::new(item_serializer())
		.with_payload_stage(CreatorIsAuthenticatedUser::new());

	let err = pipeline
		.to_internal_value(
			payload(json!([{"title": "Lamp", "owner": 7}, {"owner": 7}])),
			&alice,
		)
		.unwrap_err();
	let errors = err.as_validation_errors().unwrap();

	assert!(errors.get("[1].title").is_some());
	assert_eq!(errors.len(), 1);
}

#[rstest]
fn test_strip_then_attribute(alice: SerializerContext) {
	let pipeline = Pipeline::new(item_serializer())
		.with_payload_stage(RemoveFieldsOnCreation::new(vec![
			"id".to_string(),
			"creator".to_string(),
		]))
		.with_payload_stage(CreatorIsAuthenticatedUser::new());

	let validated = pipeline
		.to_internal_value(
			payload(json!({"id": 99, "title": "Lamp", "creator": 1, "owner": 7})),
			&alice,
		)
		.unwrap();

	assert_eq!(
		validated.into_value(),
		json!({"title": "Lamp", "creator": 42, "owner": 7})
	);
}

#[rstest]
fn test_attribute_then_strip_removes_creator(alice: SerializerContext) {
	let pipeline = Pipeline::new(item_serializer())
		.with_payload_stage(CreatorIsAuthenticatedUser::new())
		.with_payload_stage(RemoveFieldsOnCreation::new(vec!["creator".to_string()]));

	let err = pipeline
		.to_internal_value(payload(json!({"title": "Lamp", "owner": 7})), &alice)
		.unwrap_err();

	assert!(err.as_validation_errors().unwrap().get("creator").is_some());
}

#[rstest]
fn test_hash_through_pipeline(alice: SerializerContext) {
	let plain = item_serializer();
	let expected = ContentHasher::new().hash_map(&plain.to_representation(&item(), &alice).unwrap());

	let pipeline = Pipeline::new(item_serializer()).with_representation_stage(WithHash::new());
	let first = pipeline.to_representation(&item(), &alice).unwrap();
	let second = pipeline.to_representation(&item(), &alice).unwrap();

	assert_eq!(first["hash"], json!(expected));
	assert_eq!(first, second);
	assert_eq!(first.keys().last().map(String::as_str), Some("hash"));
}

#[rstest]
fn test_hash_changes_with_content(alice: SerializerContext) {
	let pipeline = Pipeline::new(item_serializer()).with_representation_stage(WithHash::new());
	let renamed = item().with_value("title", "Desk");

	let original = pipeline.to_representation(&item(), &alice).unwrap();
	let changed = pipeline.to_representation(&renamed, &alice).unwrap();

	assert_ne!(original["hash"], changed["hash"]);
}

#[rstest]
fn test_to_representation_many_hashes_each_item(alice: SerializerContext) {
	let pipeline = Pipeline::new(item_serializer()).with_representation_stage(WithHash::new());
	let first = item();
	let second = item().with_value("id", 2);
	let instances: Vec<&dyn reinhardt_serializers::Model> = vec![&first, &second];

	let reprs = pipeline.to_representation_many(&instances, &alice).unwrap();

	assert_eq!(reprs.len(), 2);
	assert_ne!(reprs[0]["hash"], reprs[1]["hash"]);
}

#[rstest]
fn test_shared_pipeline_across_threads() {
	let pipeline = Arc::new(
		Pipeline::new(item_serializer())
			.with_payload_stage(CreatorIsAuthenticatedUser::new())
			.with_representation_stage(WithHash::new()),
	);
	let expected_hash = pipeline
		.to_representation(&item(), &SerializerContext::new())
		.unwrap()["hash"]
		.clone();

	let handles: Vec<_> = (0..8)
		.map(|user_id| {
			let pipeline = Arc::clone(&pipeline);
			std::thread::spawn(move || {
				let context = SerializerContext::new().with_request(Request::authenticated(
					AuthenticatedUser::new(user_id, format!("user{}", user_id)),
				));
				let validated = pipeline
					.to_internal_value(
						Payload::from_value(json!({"title": "Lamp", "creator": -1, "owner": 7}))
							.unwrap(),
						&context,
					)
					.unwrap();
				let repr = pipeline.to_representation(&item(), &context).unwrap();
				(user_id, validated.into_value(), repr["hash"].clone())
			})
		})
		.collect();

	for handle in handles {
		let (user_id, validated, hash) = handle.join().unwrap();
		assert_eq!(validated["creator"], json!(user_id));
		assert_eq!(hash, expected_hash);
	}
}

#[rstest]
fn test_settings_end_to_end(alice: SerializerContext) {
	let settings = OverlaySettings::from_toml_str(
		r#"
		[hash]
		key = "etag"

		[attribution]
		policy = "literal"

		[remove_fields_on_creation]
		fields = ["id", "creator"]

		[read_nested_fields]
		owner = "ExpandedOwnerField"
		"#,
	)
	.unwrap();
	assert_eq!(settings.attribution.as_ref().unwrap().policy, AliasPolicy::Literal);
	assert_eq!(settings.remove_fields_on_creation.scope, StripScope::TopLevel);

	let mut registry = FieldRegistry::with_defaults();
	registry.register(NestedRelatedField::class("ExpandedOwnerField", owner_serializer()));

	let meta = settings.apply_to_meta(SerializerMeta::new(), &registry).unwrap();
	let serializer = item_serializer()
		.with_meta(meta)
		.with_field_builder(Arc::new(settings.field_builder(&registry).unwrap()));
	let pipeline = settings.build_pipeline(serializer);

	let repr = pipeline.to_representation(&item(), &alice).unwrap();
	assert_eq!(repr["owner"], json!({"id": 7, "name": "Ada"}));
	assert!(repr["etag"].is_string());
	assert!(!repr.contains_key("hash"));

	let validated = pipeline
		.to_internal_value(
			payload(json!({"id": 5, "title": "Lamp", "creator": 1, "owner": 7})),
			&alice,
		)
		.unwrap();
	assert_eq!(
		validated.into_value(),
		json!({"title": "Lamp", "creator": 42, "owner": 7})
	);
}
