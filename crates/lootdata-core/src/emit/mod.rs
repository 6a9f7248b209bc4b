//! # Emitters
//!
//! Two independent output forms over the resolved datasets:
//! - [`blob`]: per-collection JSON, raw DEFLATE and base64 (`ns.CompressedData`)
//! - [`literal`]: uncompressed Lua table with a hash sentinel (`ns.StaticData`)

pub mod blob;
pub mod literal;

pub use blob::{CompressedBundle, EncodedCollection, decode_collection, encode_collection};
pub use literal::{lua_escape, render_static_lua};
