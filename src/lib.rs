//! Encoder and decoder for TOON (Token-Oriented Object Notation), a
//! compact, human-readable text encoding of the JSON data model. TOON
//! blends significant indentation with CSV-style tabular rows to cut token
//! count for structured payloads while staying losslessly convertible to
//! and from JSON.
//!
//! # Examples
//!
//! Encode and decode a typed value:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use toon_codec::{decode, encode, DecodeOptions, EncodeOptions};
//!
//! #[derive(Debug, Serialize, Deserialize, PartialEq)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let user = User {
//!     name: "Ada Lovelace".to_string(),
//!     age: 37,
//! };
//! let toon = encode(&user, &EncodeOptions::default())?;
//! assert_eq!(toon, "name: Ada Lovelace\nage: 37");
//!
//! let round_trip: User = decode(&toon, &DecodeOptions::default())?;
//! assert_eq!(round_trip, user);
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! Uniform arrays of objects collapse to tabular rows:
//!
//! ```rust
//! use serde_json::json;
//! use toon_codec::{encode, EncodeOptions};
//!
//! let value = json!({"users": [
//!     {"id": 1, "name": "Alice", "role": "admin"},
//!     {"id": 2, "name": "Bob", "role": "user"}
//! ]});
//! let toon = encode(&value, &EncodeOptions::default())?;
//! assert_eq!(toon, "users[2]{id,name,role}:\n  1,Alice,admin\n  2,Bob,user");
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! Untyped decoding yields a [`Value`]:
//!
//! ```rust
//! use toon_codec::{decode_value, DecodeOptions};
//!
//! let value = decode_value("numbers[3]: 1,2,3", &DecodeOptions::default())?;
//! assert_eq!(value, serde_json::json!({"numbers": [1, 2, 3]}));
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! Custom options:
//!
//! ```rust
//! use serde_json::json;
//! use toon_codec::{encode, Delimiter, EncodeOptions, KeyFolding};
//!
//! let opts = EncodeOptions::new()
//!     .with_delimiter(Delimiter::Pipe)
//!     .with_key_folding(KeyFolding::Safe);
//! let toon = encode(&json!({"a": {"b": {"items": ["x", "y"]}}}), &opts)?;
//! assert_eq!(toon, "a.b.items[2|]: x|y");
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! ```rust
//! use toon_codec::{decode_value, DecodeOptions, ExpandPaths};
//!
//! let opts = DecodeOptions::new()
//!     .with_strict(false)
//!     .with_expand_paths(ExpandPaths::Safe);
//! let value = decode_value("a.b: 1", &opts)?;
//! assert_eq!(value, serde_json::json!({"a": {"b": 1}}));
//! # Ok::<(), toon_codec::Error>(())
//! ```

pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod num;
pub mod options;
pub mod text;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use crate::error::{Error, ErrorKind, Location};
pub use crate::options::{
    DecodeOptions, Delimiter, EncodeOptions, ExpandPaths, Indent, KeyFolding,
};
pub use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

/// Encode any serializable value as TOON text.
pub fn encode<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    encode::encode(value, options)
}

/// Encode any serializable value as UTF-8 TOON bytes.
pub fn encode_to_bytes<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    encode::encode_to_bytes(value, options)
}

/// Encode a [`Value`] tree directly, without the serde round-trip.
pub fn encode_value(value: &Value, options: &EncodeOptions) -> Result<String> {
    encode::encode_value(value, options)
}

/// Decode TOON text into any deserializable value.
pub fn decode<T: DeserializeOwned>(input: &str, options: &DecodeOptions) -> Result<T> {
    decode::decode(input, options)
}

/// Decode UTF-8 TOON bytes into any deserializable value.
pub fn decode_slice<T: DeserializeOwned>(input: &[u8], options: &DecodeOptions) -> Result<T> {
    decode::decode_slice(input, options)
}

/// Decode TOON text into a [`Value`] tree.
pub fn decode_value(input: &str, options: &DecodeOptions) -> Result<Value> {
    decode::decode_value(input, options)
}
