//! Deterministic content hashing for JSON values
//!
//! Values are fed into SHA-256 in a canonical, type-tagged encoding:
//! object keys are visited in sorted order, array order is significant and
//! every scalar carries its JSON type, so `1` and `"1"` hash differently.
//! Numbers are encoded by their JSON text, so `1` and `1.0` differ too.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Canonical SHA-256 hasher for JSON content
///
/// # Examples
///
/// ```
/// use reinhardt_overlays::ContentHasher;
/// use serde_json::json;
///
/// let hasher = ContentHasher::new();
/// let a = hasher.hash(&json!({"id": 1, "title": "Lamp"}));
/// let b = hasher.hash(&json!({"title": "Lamp", "id": 1}));
///
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
	pub fn new() -> Self {
		Self
	}

	/// Lowercase hex digest of `value`
	pub fn hash(&self, value: &Value) -> String {
		let mut digest = Sha256::new();
		feed(&mut digest, value);
		hex::encode(digest.finalize())
	}

	/// Lowercase hex digest of a JSON object
	pub fn hash_map(&self, map: &Map<String, Value>) -> String {
		let mut digest = Sha256::new();
		feed_object(&mut digest, map);
		hex::encode(digest.finalize())
	}
}

/// Hash a value with the default [`ContentHasher`]
pub fn make_hash(value: &Value) -> String {
	ContentHasher::new().hash(value)
}

fn feed_bytes(digest: &mut Sha256, tag: u8, bytes: &[u8]) {
	digest.update([tag]);
	digest.update((bytes.len() as u64).to_be_bytes());
	digest.update(bytes);
}

fn feed_object(digest: &mut Sha256, map: &Map<String, Value>) {
	let mut keys: Vec<&String> = map.keys().collect();
	keys.sort();

	digest.update([b'o']);
	digest.update((keys.len() as u64).to_be_bytes());
	for key in keys {
		feed_bytes(digest, b'k', key.as_bytes());
		feed(digest, &map[key.as_str()]);
	}
}

fn feed(digest: &mut Sha256, value: &Value) {
	match value {
		Value::Null => digest.update([b'n']),
		Value::Bool(flag) => digest.update([b'b', u8::from(*flag)]),
		Value::Number(number) => feed_bytes(digest, b'i', number.to_string().as_bytes()),
		Value::String(text) => feed_bytes(digest, b's', text.as_bytes()),
		Value::Array(items) => {
			digest.update([b'a']);
			digest.update((items.len() as u64).to_be_bytes());
			for item in items {
				feed(digest, item);
			}
		}
		Value::Object(map) => feed_object(digest, map),
	}
}
