//! # Reinhardt Mixins
//!
//! Serializer mixins for Reinhardt model serializers, inspired by the
//! serializer mixins commonly layered on Django REST Framework.
//!
//! Instead of stacking mixin classes, behaviors are composed explicitly:
//! payload and representation overlays run in the order they are added to a
//! [`Pipeline`](overlays::Pipeline), and relation overlays plug into the
//! serializer's relational field builder.
//!
//! ## Feature Flags
//!
//! - `overlays` (default) - Hashing, attribution, field stripping,
//!   read-nested/write-flat relations and TOML configuration
//!
//! With `default-features = false` only the serializer base is built.
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_mixins::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let note = Arc::new(
//!     ModelMeta::new("Note")
//!         .with_field(ModelFieldMeta::new("id").pk())
//!         .with_field(ModelFieldMeta::new("body")),
//! );
//! let serializer = Pipeline::new(ModelSerializer::new(note.clone()).with_field("id").with_field("body"))
//!     .with_representation_stage(WithHash::new());
//!
//! let instance = Record::new(note).with_value("id", 1).with_value("body", "hi");
//! let repr = serializer
//!     .to_representation(&instance, &SerializerContext::new())
//!     .unwrap();
//!
//! assert_eq!(repr["body"], json!("hi"));
//! assert_eq!(repr["hash"], json!(make_hash(&json!({"id": 1, "body": "hi"}))));
//! ```

pub use reinhardt_serializers as serializers;

#[cfg(feature = "overlays")]
pub use reinhardt_overlays as overlays;

// Re-export commonly used types at the crate root
pub use reinhardt_serializers::{
	ConversionMode, Model, ModelSerializer, Payload, Representation, Serializer,
	SerializerContext, SerializerError, SerializerMeta,
};

#[cfg(feature = "overlays")]
pub use reinhardt_overlays::{
	CreatorIsAuthenticatedUser, OverlaySettings, Pipeline, ReadNestedWriteFlat,
	RemoveFieldsOnCreation, WithHash,
};

/// Prelude module for convenient imports
pub mod prelude {
	pub use reinhardt_serializers::{
		AuthenticatedUser, ConversionMode, FieldClass, FieldRegistry, InternalValue, Model,
		ModelFieldMeta, ModelMeta, ModelSerializer, NestedRelatedField, Payload,
		PrimaryKeyRelatedField, Record, RelationInfo, RelationalFieldBuilder, Representation,
		Request, Serializer, SerializerContext, SerializerError, SerializerMeta, SlugRelatedField,
		StringRelatedField,
	};

	#[cfg(feature = "overlays")]
	pub use reinhardt_overlays::{
		AliasPolicy, CreatorIsAuthenticatedUser, OverlaySettings, PayloadStage, Pipeline,
		ReadNestedWriteFlat, RemoveFieldsOnCreation, RepresentationStage, StripScope, WithHash,
		make_hash,
	};
}
