//! Selection dispatcher
//!
//! `select` and `select_all` append their "all matches" flag to the caller's
//! arguments, unless the caller already ends with an explicit flag after at
//! least one other argument. One routine then picks a mode:
//!
//! ```text
//! [Node | Nodes, flag]          → wrap as-is
//! ["<markup>", flag]            → parse a fragment into new nodes
//! [selector, flag]              → query under the document root
//! [parent, selector, flag]      → query under `parent`
//! ```

use crate::error::{QueryError, Result};
use crate::host::Host;
use crate::wrapper::Wrapper;
use dom::NodeId;
use std::cell::{Ref, RefCell, RefMut};
use tracing::debug;

/// One element, or an ordered collection fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(NodeId),
    Many(Vec<NodeId>),
}

impl Selection {
    /// Every node held, in order
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Selection::Single(node) => std::slice::from_ref(node),
            Selection::Many(nodes) => nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }
}

/// Selection argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    Node(NodeId),
    Nodes(&'a [NodeId]),
    Str(&'a str),
    Flag(bool),
}

impl From<NodeId> for Arg<'_> {
    fn from(node: NodeId) -> Self {
        Arg::Node(node)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Str(s)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(s: &'a String) -> Self {
        Arg::Str(s)
    }
}

impl From<bool> for Arg<'_> {
    fn from(flag: bool) -> Self {
        Arg::Flag(flag)
    }
}

impl<'a> From<&'a Selection> for Arg<'a> {
    fn from(selection: &'a Selection) -> Self {
        match selection {
            Selection::Single(node) => Arg::Node(*node),
            Selection::Many(nodes) => Arg::Nodes(nodes),
        }
    }
}

impl<'a, H: Host> From<&'a Wrapper<'_, H>> for Arg<'a> {
    fn from(wrapper: &'a Wrapper<'_, H>) -> Self {
        wrapper.selection().into()
    }
}

/// Markup is anything shaped like `<…>` with at least one character inside
fn is_fragment(s: &str) -> bool {
    s.len() >= 3 && s.starts_with('<') && s.ends_with('>')
}

/// Owns the host document. Every selection starts here.
pub struct Dom<H: Host> {
    host: RefCell<H>,
}

impl<H: Host> Dom<H> {
    pub fn new(host: H) -> Self {
        Self {
            host: RefCell::new(host),
        }
    }

    /// Borrow the host for reading
    pub fn host(&self) -> Ref<'_, H> {
        self.host.borrow()
    }

    /// Borrow the host for mutation. Don't hold it across wrapper calls.
    pub fn host_mut(&self) -> RefMut<'_, H> {
        self.host.borrow_mut()
    }

    pub fn into_inner(self) -> H {
        self.host.into_inner()
    }

    /// First match, or `None` when nothing matches
    pub fn select(&self, args: &[Arg<'_>]) -> Result<Option<Wrapper<'_, H>>> {
        self.resolve(&with_flag(args, false), args.len())
    }

    /// Every match, always a collection (possibly empty)
    pub fn select_all(&self, args: &[Arg<'_>]) -> Result<Wrapper<'_, H>> {
        Ok(self
            .resolve(&with_flag(args, true), args.len())?
            .unwrap_or_else(|| self.wrap(Selection::Many(Vec::new()))))
    }

    /// `select(&[selector])`
    pub fn one(&self, selector: &str) -> Result<Option<Wrapper<'_, H>>> {
        self.select(&[Arg::Str(selector)])
    }

    /// `select_all(&[selector])`
    pub fn all(&self, selector: &str) -> Result<Wrapper<'_, H>> {
        self.select_all(&[Arg::Str(selector)])
    }

    pub fn wrap(&self, selection: Selection) -> Wrapper<'_, H> {
        Wrapper::new(self, selection)
    }

    /// Parse markup into new, unattached nodes. One top-level node gives a
    /// single-element wrapper, anything else a collection.
    pub fn fragment(&self, markup: &str) -> Result<Wrapper<'_, H>> {
        self.parse(markup, false)
    }

    /// `given` is the caller's argument count, for error reporting
    fn resolve(&self, args: &[Arg<'_>], given: usize) -> Result<Option<Wrapper<'_, H>>> {
        match args {
            [Arg::Node(node), _] => {
                debug!("Wrapping node {}", node);
                Ok(Some(self.wrap(Selection::Single(*node))))
            }
            [Arg::Nodes(nodes), _] => {
                debug!("Wrapping {} nodes", nodes.len());
                Ok(Some(self.wrap(Selection::Many(nodes.to_vec()))))
            }
            [Arg::Str(markup), flag] if is_fragment(markup) => {
                let want_all = flag_at(flag, 1)?;
                self.parse(markup, want_all).map(Some)
            }
            [selector, flag] => {
                let root = self.host().root();
                self.query(root, selector_at(selector, 0)?, flag_at(flag, 1)?)
            }
            [parent, selector, flag] => {
                let Arg::Node(parent) = parent else {
                    return Err(QueryError::InvalidArgument {
                        position: 0,
                        expected: "a single parent node",
                    });
                };
                self.query(*parent, selector_at(selector, 1)?, flag_at(flag, 2)?)
            }
            _ => Err(QueryError::InvalidArity { given }),
        }
    }

    fn parse(&self, markup: &str, want_all: bool) -> Result<Wrapper<'_, H>> {
        let nodes = self.host_mut().parse_fragment(markup)?;
        debug!("Parsed fragment into {} nodes", nodes.len());

        let selection = match nodes.as_slice() {
            [node] if !want_all => Selection::Single(*node),
            _ => Selection::Many(nodes),
        };
        Ok(self.wrap(selection))
    }

    fn query(&self, scope: NodeId, selector: &str, want_all: bool) -> Result<Option<Wrapper<'_, H>>> {
        if want_all {
            let nodes = self.host().query_all(scope, selector)?;
            debug!("Query '{}' under {} matched {} nodes", selector, scope, nodes.len());
            return Ok(Some(self.wrap(Selection::Many(nodes))));
        }

        let found = self.host().query_one(scope, selector)?;
        debug!("Query '{}' under {} matched {:?}", selector, scope, found);
        Ok(found.map(|node| self.wrap(Selection::Single(node))))
    }
}

impl<H: Host + Default> Default for Dom<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

/// Caller arguments plus the default flag, unless an explicit one already closes them
fn with_flag<'a>(args: &[Arg<'a>], default: bool) -> Vec<Arg<'a>> {
    let mut args = args.to_vec();
    if !matches!(args.as_slice(), [_, .., Arg::Flag(_)]) {
        args.push(Arg::Flag(default));
    }
    args
}

fn selector_at<'a>(arg: &Arg<'a>, position: usize) -> Result<&'a str> {
    match arg {
        Arg::Str(selector) => Ok(*selector),
        _ => Err(QueryError::InvalidArgument {
            position,
            expected: "a selector string",
        }),
    }
}

fn flag_at(arg: &Arg<'_>, position: usize) -> Result<bool> {
    match arg {
        Arg::Flag(flag) => Ok(*flag),
        _ => Err(QueryError::InvalidArgument {
            position,
            expected: "a flag",
        }),
    }
}
