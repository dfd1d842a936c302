//! Serializer execution context
//!
//! Carries the request a conversion runs under. Accessors return
//! [`SerializerError::MissingContext`] instead of panicking when a piece of
//! the context was never supplied.

use crate::error::{Result, SerializerError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of the caller that authenticated the current request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
	pub id: Value,
	pub username: String,
}

impl AuthenticatedUser {
	pub fn new(id: impl Into<Value>, username: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			username: username.into(),
		}
	}
}

/// The request a serializer is invoked for
#[derive(Debug, Clone, Default)]
pub struct Request {
	user: Option<AuthenticatedUser>,
}

impl Request {
	/// A request without an authenticated user
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// A request made by the given user
	pub fn authenticated(user: AuthenticatedUser) -> Self {
		Self { user: Some(user) }
	}

	pub fn is_authenticated(&self) -> bool {
		self.user.is_some()
	}

	/// The authenticated user
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_serializers::{AuthenticatedUser, Request};
	///
	/// let request = Request::authenticated(AuthenticatedUser::new(42, "alice"));
	/// assert_eq!(request.user().unwrap().username, "alice");
	///
	/// assert!(Request::anonymous().user().is_err());
	/// ```
	pub fn user(&self) -> Result<&AuthenticatedUser> {
		self.user
			.as_ref()
			.ok_or_else(|| SerializerError::missing_context("request.user"))
	}
}

/// Context passed to every conversion call
///
/// # Examples
///
/// ```
/// use reinhardt_serializers::{AuthenticatedUser, Request, SerializerContext};
/// use serde_json::json;
///
/// let context = SerializerContext::new()
///     .with_request(Request::authenticated(AuthenticatedUser::new(7, "bob")))
///     .with_extra("format", json!("json"));
///
/// assert_eq!(context.request().unwrap().user().unwrap().id, json!(7));
/// assert_eq!(context.extra("format"), Some(&json!("json")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SerializerContext {
	request: Option<Request>,
	extra: Map<String, Value>,
}

impl SerializerContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_request(mut self, request: Request) -> Self {
		self.request = Some(request);
		self
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
		self.extra.insert(key.into(), value);
		self
	}

	/// The request this conversion runs under
	pub fn request(&self) -> Result<&Request> {
		self.request
			.as_ref()
			.ok_or_else(|| SerializerError::missing_context("request"))
	}

	/// Arbitrary extra context supplied by the caller
	pub fn extra(&self, key: &str) -> Option<&Value> {
		self.extra.get(key)
	}
}
