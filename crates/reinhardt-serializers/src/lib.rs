//! # reinhardt-serializers
//!
//! Model serializer base used by the Reinhardt serializer overlays.
//!
//! This crate provides the pieces a Django REST Framework style
//! `ModelSerializer` is built from, in a form the overlays can hook into
//! explicitly:
//!
//! - **Model introspection**: [`Model`], [`ModelMeta`], [`Record`]
//! - **Relation metadata**: [`RelationInfo`], [`RelationKwargs`], [`get_relation_kwargs`]
//! - **Relational field classes**: [`FieldClass`] and the built-in
//!   primary key, slug, hyperlinked, string and nested fields
//! - **Request context**: [`SerializerContext`], [`Request`], [`AuthenticatedUser`]
//! - **Conversion**: the [`Serializer`] trait and [`ModelSerializer`]
//!
//! Relational fields are constructed per call through a
//! [`RelationalFieldBuilder`] that receives the [`ConversionMode`], so the
//! field used for output can differ from the one used for input.

pub mod context;
pub mod error;
pub mod fields;
pub mod meta;
pub mod model;
pub mod registry;
pub mod relations;
pub mod serializer;

pub use context::{AuthenticatedUser, Request, SerializerContext};
pub use error::{FieldError, Result, SerializerError, ValidationErrors};
pub use fields::{
	FieldClass, FieldOptions, HyperlinkedRelatedField, NestedRelatedField, PrimaryKeyRelatedField,
	RelatedField, RelatedFieldFactory, SlugRelatedField, StringRelatedField, UrlReverser,
};
pub use meta::SerializerMeta;
pub use model::{Model, ModelFieldMeta, ModelMeta, Record, RelatedValue};
pub use registry::FieldRegistry;
pub use relations::{RelationInfo, RelationKwargs, get_relation_kwargs};
pub use serializer::{
	ConversionMode, DefaultRelationalFieldBuilder, InternalValue, ModelSerializer, Payload,
	RelationalFieldBuilder, Representation, Serializer,
};
