//! Chainable document manipulation
//!
//! A thin wrapper layer over a document host. Selection returns a `Wrapper`
//! around one element or an ordered collection; every operation forwards to
//! the host once, once per member, or refuses when it needs a single target.
//!
//! ```text
//! Dom::select / select_all → resolve(args) → Wrapper { Single | Many }
//!                                               ↓
//!                                         Host (dom::Document)
//! ```
//!
//! ```
//! use query::{Dom, Arg};
//!
//! let dom = Dom::new(dom::Document::from_html("<ul><li>a</li><li>b</li></ul>").unwrap());
//! let root = dom.host().root();
//!
//! dom.select_all(&[Arg::Node(root), "li".into()])
//!     .unwrap()
//!     .add_class(&["item"])
//!     .unwrap();
//! assert_eq!(dom.all(".item").unwrap().len(), 2);
//! ```

pub mod error;
pub mod host;
pub mod selection;
pub mod wrapper;

pub use error::{QueryError, Result};
pub use host::Host;
pub use selection::{Arg, Dom, Selection};
pub use wrapper::{Content, Wrapper};

pub use dom::{Event, InsertPosition, NodeId};
