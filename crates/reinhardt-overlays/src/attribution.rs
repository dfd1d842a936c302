//! Creator attribution overlay for inbound payloads

use crate::pipeline::PayloadStage;
use reinhardt_serializers::{Payload, Result, SerializerContext};
use serde::{Deserialize, Serialize};

/// Field name the caller's identity is written to
pub const CREATOR_FIELD: &str = "creator";

/// Which key the attribution overlay writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasPolicy {
	/// Always write `"creator"`, whatever alias is configured
	#[default]
	Literal,
	/// Write under [`CreatorIsAuthenticatedUser::creator_alias`]
	Honor,
}

/// Sets the authenticated caller as creator on every inbound mapping
///
/// Client supplied values under the target key are overwritten. Bulk
/// payloads are attributed item by item. The caller is read from
/// `context.request().user()`; a missing request or an anonymous user fails
/// the conversion with [`SerializerError::MissingContext`].
///
/// [`SerializerError::MissingContext`]: reinhardt_serializers::SerializerError::MissingContext
///
/// # Examples
///
/// ```
/// use reinhardt_overlays::{CreatorIsAuthenticatedUser, PayloadStage};
/// use reinhardt_serializers::{AuthenticatedUser, Payload, Request, SerializerContext};
/// use serde_json::json;
///
/// let context = SerializerContext::new()
///     .with_request(Request::authenticated(AuthenticatedUser::new(42, "alice")));
/// let mut payload = Payload::from_value(json!({"title": "Lamp", "creator": 1})).unwrap();
///
/// CreatorIsAuthenticatedUser::new().apply(&mut payload, &context).unwrap();
/// assert_eq!(payload.into_value(), json!({"title": "Lamp", "creator": 42}));
/// ```
#[derive(Debug, Clone)]
pub struct CreatorIsAuthenticatedUser {
	alias: String,
	policy: AliasPolicy,
}

impl Default for CreatorIsAuthenticatedUser {
	fn default() -> Self {
		Self {
			alias: CREATOR_FIELD.to_string(),
			policy: AliasPolicy::default(),
		}
	}
}

impl CreatorIsAuthenticatedUser {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rename the creator attribute
	///
	/// Only takes effect on writes under [`AliasPolicy::Honor`].
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	pub fn with_policy(mut self, policy: AliasPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Name of the creator attribute
	pub fn creator_alias(&self) -> &str {
		&self.alias
	}

	pub fn policy(&self) -> AliasPolicy {
		self.policy
	}

	/// Key actually written to payloads
	pub fn target_key(&self) -> &str {
		match self.policy {
			AliasPolicy::Literal => CREATOR_FIELD,
			AliasPolicy::Honor => &self.alias,
		}
	}
}

impl PayloadStage for CreatorIsAuthenticatedUser {
	fn name(&self) -> &str {
		"creator_is_authenticated_user"
	}

	fn apply(&self, payload: &mut Payload, context: &SerializerContext) -> Result<()> {
		// An empty bulk payload has nothing to attribute, so no caller is required
		if payload.is_empty() {
			return Ok(());
		}

		let user = context.request()?.user()?;
		let key = self.target_key();
		for mapping in payload.mappings_mut() {
			mapping.insert(key.to_string(), user.id.clone());
		}

		tracing::debug!(
			key = key,
			user = %user.username,
			mappings = payload.len(),
			"Attributed payload to authenticated user"
		);
		Ok(())
	}
}
