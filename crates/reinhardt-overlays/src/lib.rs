//! # reinhardt-overlays
//!
//! Reusable serializer overlays for Reinhardt model serializers.
//!
//! Each overlay is a small, independently usable behavior:
//!
//! - [`WithHash`]: appends a deterministic content digest to every
//!   outbound representation
//! - [`CreatorIsAuthenticatedUser`]: stamps the authenticated caller as
//!   creator on every inbound mapping, overwriting client values
//! - [`RemoveFieldsOnCreation`]: strips configured keys from inbound
//!   payloads before validation
//! - [`ReadNestedWriteFlat`]: emits expanded objects for selected relations
//!   on output while accepting flat references on input
//!
//! Payload and representation overlays compose through a [`Pipeline`],
//! which runs its stages in the order they were added. Relation overlays
//! plug into [`ModelSerializer::with_field_builder`].
//!
//! [`ModelSerializer::with_field_builder`]: reinhardt_serializers::ModelSerializer::with_field_builder
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use reinhardt_overlays::{CreatorIsAuthenticatedUser, Pipeline, RemoveFieldsOnCreation};
//! use reinhardt_serializers::{
//!     AuthenticatedUser, ModelFieldMeta, ModelMeta, ModelSerializer, Payload, Request, Serializer,
//!     SerializerContext,
//! };
//!
//! let item = Arc::new(
//!     ModelMeta::new("Item")
//!         .with_field(ModelFieldMeta::new("id").pk())
//!         .with_field(ModelFieldMeta::new("title"))
//!         .with_field(ModelFieldMeta::new("creator")),
//! );
//! let serializer = Pipeline::new(
//!     ModelSerializer::new(item)
//!         .with_field("id")
//!         .with_field("title")
//!         .with_field("creator"),
//! )
//! .with_payload_stage(RemoveFieldsOnCreation::new(vec!["creator".to_string()]))
//! .with_payload_stage(CreatorIsAuthenticatedUser::new());
//!
//! let context = SerializerContext::new()
//!     .with_request(Request::authenticated(AuthenticatedUser::new(42, "alice")));
//! let payload = Payload::from_value(json!({"title": "Lamp", "creator": 1})).unwrap();
//!
//! let validated = serializer.to_internal_value(payload, &context).unwrap();
//! assert_eq!(validated.into_value(), json!({"title": "Lamp", "creator": 42}));
//! ```

pub mod attribution;
pub mod hasher;
pub mod hashing;
pub mod nested;
pub mod pipeline;
pub mod settings;
pub mod strip;

pub use attribution::{AliasPolicy, CREATOR_FIELD, CreatorIsAuthenticatedUser};
pub use hasher::{ContentHasher, make_hash};
pub use hashing::{DEFAULT_HASH_KEY, WithHash};
pub use nested::ReadNestedWriteFlat;
pub use pipeline::{PayloadStage, Pipeline, RepresentationStage};
pub use settings::{
	AttributionSettings, HashSettings, OverlaySettings, RemoveFieldsSettings, SettingsError,
};
pub use strip::{RemoveFieldsOnCreation, StripScope};
