//! Error types for serializer conversions
//!
//! Conversions either fully succeed or fail with a [`SerializerError`].
//! Field-level problems found while validating an inbound payload are
//! collected into [`ValidationErrors`] before being returned.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the serializer crates
pub type Result<T> = std::result::Result<T, SerializerError>;

/// Per-field validation messages, keyed by field name
///
/// Keys are kept sorted so error output is stable across runs.
///
/// # Examples
///
/// ```
/// use reinhardt_serializers::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("title", "This field is required.");
///
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.get("title"), Some(&["This field is required.".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
	errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
	/// Create an empty error collection
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a message for a field
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.errors
			.entry(field.into())
			.or_default()
			.push(message.into());
	}

	/// Messages recorded for a field, if any
	pub fn get(&self, field: &str) -> Option<&[String]> {
		self.errors.get(field).map(Vec::as_slice)
	}

	/// Names of the fields that failed
	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.errors.keys().map(String::as_str)
	}

	/// Number of failing fields
	pub fn len(&self) -> usize {
		self.errors.len()
	}

	/// Whether no errors were recorded
	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	/// Prefix every field name, used to locate errors inside bulk payloads
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_serializers::ValidationErrors;
	///
	/// let mut errors = ValidationErrors::new();
	/// errors.add("title", "This field is required.");
	///
	/// let prefixed = errors.prefixed("[2]");
	/// assert!(prefixed.get("[2].title").is_some());
	/// ```
	pub fn prefixed(self, prefix: &str) -> Self {
		let errors = self
			.errors
			.into_iter()
			.map(|(field, messages)| (format!("{}.{}", prefix, field), messages))
			.collect();
		Self { errors }
	}

	/// Convert into `Ok(value)` when empty, or a validation error otherwise
	pub fn into_result<T>(self, value: T) -> Result<T> {
		if self.is_empty() {
			Ok(value)
		} else {
			Err(SerializerError::Validation(self))
		}
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let rendered: Vec<String> = self
			.errors
			.iter()
			.map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
			.collect();
		write!(f, "{}", rendered.join("; "))
	}
}

/// A single field rejected its input
///
/// Returned by relational fields; the model serializer attaches the field
/// name when it folds these into [`ValidationErrors`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
	pub message: String,
}

impl FieldError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Errors that can occur during serializer conversions
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializerError {
	/// Inbound data failed validation
	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),
	/// A context attribute the conversion relies on is not available
	#[error("Missing context attribute '{attribute}'")]
	MissingContext { attribute: String },
	/// Model metadata does not describe the requested field
	#[error("Model '{model}' has no field named '{field}'")]
	UnknownField { model: String, field: String },
	/// The inbound payload has an unsupported shape
	#[error("Invalid payload: {message}")]
	InvalidPayload { message: String },
	/// A field class was constructed with unusable arguments
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	/// URL reversal failed for a hyperlinked field
	#[error("URL resolution error: {message}")]
	Url { message: String },
}

impl SerializerError {
	/// Create a missing context error for the given attribute path
	pub fn missing_context(attribute: impl Into<String>) -> Self {
		Self::MissingContext {
			attribute: attribute.into(),
		}
	}

	/// Create a configuration error
	pub fn configuration(message: impl Into<String>) -> Self {
		Self::Configuration {
			message: message.into(),
		}
	}

	/// Check if this is a validation error
	pub fn is_validation_error(&self) -> bool {
		matches!(self, SerializerError::Validation(_))
	}

	/// Get the underlying validation errors, if any
	pub fn as_validation_errors(&self) -> Option<&ValidationErrors> {
		match self {
			SerializerError::Validation(errors) => Some(errors),
			_ => None,
		}
	}
}
