//! In-memory HTML document
//!
//! An arena-backed node tree with just enough of the browser DOM to drive a
//! query layer: markup parsing and serialization, CSS selector matching,
//! attribute/class/dataset/style storage, form values and click dispatch.
//!
//! ## Core Design
//!
//! ```text
//! markup → parser (html5ever tokenizer) → DomArena ← Document API
//!                                            ↓
//!                                      NodeId (u32)
//! ```
//!
//! Nodes are addressed by index and never freed, so an id handed out once
//! stays valid for the life of the document, attached or not.

pub mod arena;
pub mod document;
pub mod error;
pub mod events;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::{Document, DocumentConfig};
pub use error::{DomError, Result};
pub use events::{Event, EventCallback, ListenerId};
pub use selector::SelectorList;
pub use serializer::{DomSerializer, SerializerConfig};
pub use types::*;
