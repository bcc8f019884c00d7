//! Wrapper - chainable operations over one element or a collection
//!
//! Every method branches on the held `Selection`: apply once, apply to each
//! member in order, or refuse with `MultipleNodes` when the operation only
//! makes sense for a single target.

use crate::error::{QueryError, Result};
use crate::host::Host;
use crate::selection::{Arg, Dom, Selection};
use dom::{Event, EventCallback, InsertPosition, NodeId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Content for `append`, `prepend`, `before` and `after`
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    /// Parsed and inserted as new nodes
    Markup(&'a str),
    /// Existing nodes, moved into place
    Selection(&'a Selection),
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(markup: &'a str) -> Self {
        Content::Markup(markup)
    }
}

impl<'a> From<&'a String> for Content<'a> {
    fn from(markup: &'a String) -> Self {
        Content::Markup(markup)
    }
}

impl<'a> From<&'a Selection> for Content<'a> {
    fn from(selection: &'a Selection) -> Self {
        Content::Selection(selection)
    }
}

impl<'a, H: Host> From<&'a Wrapper<'_, H>> for Content<'a> {
    fn from(wrapper: &'a Wrapper<'_, H>) -> Self {
        Content::Selection(wrapper.selection())
    }
}

pub struct Wrapper<'d, H: Host> {
    dom: &'d Dom<H>,
    selection: Selection,
}

impl<'d, H: Host> Wrapper<'d, H> {
    pub(crate) fn new(dom: &'d Dom<H>, selection: Selection) -> Self {
        Self { dom, selection }
    }

    pub fn dom(&self) -> &'d Dom<H> {
        self.dom
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn nodes(&self) -> &[NodeId] {
        self.selection.nodes()
    }

    /// The element, when this wrapper holds exactly one
    pub fn node(&self) -> Option<NodeId> {
        match self.selection {
            Selection::Single(node) => Some(node),
            Selection::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    fn single(&self, action: &'static str) -> Result<NodeId> {
        self.node().ok_or(QueryError::MultipleNodes { action })
    }

    /// Run `f` against the host for every held node, in order
    fn each<F>(&self, mut f: F) -> Result<&Self>
    where
        F: FnMut(&mut H, NodeId) -> dom::Result<()>,
    {
        let mut host = self.dom.host_mut();
        for &node in self.nodes() {
            f(&mut *host, node)?;
        }
        Ok(self)
    }

    // ---- traversal ----------------------------------------------------------

    /// First descendant matching `selector`
    pub fn find(&self, selector: &str) -> Result<Option<Wrapper<'d, H>>> {
        let node = self.single("search descendants")?;
        self.dom.select(&[Arg::Node(node), Arg::Str(selector)])
    }

    /// Every descendant matching `selector`
    pub fn find_all(&self, selector: &str) -> Result<Wrapper<'d, H>> {
        let node = self.single("search descendants")?;
        self.dom.select_all(&[Arg::Node(node), Arg::Str(selector)])
    }

    // ---- events -------------------------------------------------------------

    /// Simulate a click on the element
    pub fn click(&self) -> Result<&Self> {
        let node = self.single("simulate a click")?;
        let invoked = self.dom.host().click(node)?;
        trace!("Click on {} ran {} listeners", node, invoked);
        Ok(self)
    }

    /// Bind a click listener on every held node
    pub fn on_click<F>(&self, callback: F) -> Result<&Self>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let callback: EventCallback = Arc::new(callback);
        self.each(|host, node| host.add_click_listener(node, callback.clone()).map(|_| ()))
    }

    /// Drop every click listener on the held nodes
    pub fn off_click(&self) -> Result<&Self> {
        self.each(|host, node| host.remove_click_listeners(node).map(|_| ()))
    }

    // ---- structure ----------------------------------------------------------

    /// Detached copy, with descendants when `deep`
    pub fn clone_node(&self, deep: bool) -> Result<Wrapper<'d, H>> {
        let node = self.single("make a clone")?;
        let copy = self.dom.host_mut().clone_node(node, deep)?;
        Ok(Wrapper::new(self.dom, Selection::Single(copy)))
    }

    /// Detach from the tree. Already detached nodes are left alone.
    pub fn remove(&self) -> Result<&Self> {
        self.each(|host, node| host.remove(node))
    }

    pub fn html(&self) -> Result<String> {
        let node = self.single("get innerHTML")?;
        Ok(self.dom.host().inner_html(node)?)
    }

    pub fn set_html(&self, markup: &str) -> Result<&Self> {
        self.each(|host, node| host.set_inner_html(node, markup))
    }

    pub fn text(&self) -> Result<String> {
        let node = self.single("get textContent")?;
        Ok(self.dom.host().text_content(node)?)
    }

    pub fn set_text(&self, text: &str) -> Result<&Self> {
        self.each(|host, node| host.set_text_content(node, text))
    }

    pub fn empty(&self) -> Result<&Self> {
        self.set_html("")
    }

    /// Insert as last children
    pub fn append<'c>(&self, content: impl Into<Content<'c>>) -> Result<&Self> {
        self.insert(InsertPosition::BeforeEnd, content.into())
    }

    /// Insert as first children
    pub fn prepend<'c>(&self, content: impl Into<Content<'c>>) -> Result<&Self> {
        self.insert(InsertPosition::AfterBegin, content.into())
    }

    /// Insert as previous siblings
    pub fn before<'c>(&self, content: impl Into<Content<'c>>) -> Result<&Self> {
        self.insert(InsertPosition::BeforeBegin, content.into())
    }

    /// Insert as next siblings
    pub fn after<'c>(&self, content: impl Into<Content<'c>>) -> Result<&Self> {
        self.insert(InsertPosition::AfterEnd, content.into())
    }

    fn insert(&self, position: InsertPosition, content: Content<'_>) -> Result<&Self> {
        let target = self.single("insert contents around each")?;

        match content {
            Content::Markup(markup) => {
                self.dom
                    .host_mut()
                    .insert_adjacent_html(target, position, markup)?;
            }
            Content::Selection(Selection::Single(node)) => {
                let is_element = self.dom.host().is_element(*node);
                if !is_element {
                    debug!("Ignoring non-element node {} as insertion content", node);
                    return Ok(self);
                }
                self.dom
                    .host_mut()
                    .insert_adjacent_nodes(target, position, std::slice::from_ref(node))?;
            }
            Content::Selection(Selection::Many(nodes)) => {
                self.dom
                    .host_mut()
                    .insert_adjacent_nodes(target, position, nodes)?;
            }
        }
        Ok(self)
    }

    // ---- form values --------------------------------------------------------

    pub fn val(&self) -> Result<Option<String>> {
        let node = self.single("get value")?;
        Ok(self.dom.host().value(node)?)
    }

    pub fn set_val(&self, value: &str) -> Result<&Self> {
        self.each(|host, node| host.set_value(node, value))
    }

    // ---- classes --------------------------------------------------------------

    pub fn add_class(&self, tokens: &[&str]) -> Result<&Self> {
        for token in tokens {
            self.each(|host, node| host.add_class(node, token))?;
        }
        Ok(self)
    }

    /// Remove the given tokens, or every class when `tokens` is empty
    pub fn remove_class(&self, tokens: &[&str]) -> Result<&Self> {
        if tokens.is_empty() {
            return self.each(|host, node| host.clear_classes(node));
        }
        for token in tokens {
            self.each(|host, node| host.remove_class(node, token))?;
        }
        Ok(self)
    }

    // ---- attributes -----------------------------------------------------------

    pub fn attr(&self, name: &str) -> Result<Option<String>> {
        let node = self.single("get attributes")?;
        Ok(self.dom.host().attribute(node, name)?)
    }

    pub fn set_attr(&self, name: &str, value: &str) -> Result<&Self> {
        self.set_attrs(&[(name, value)])
    }

    pub fn set_attrs(&self, attributes: &[(&str, &str)]) -> Result<&Self> {
        for (name, value) in attributes {
            self.each(|host, node| host.set_attribute(node, name, value))?;
        }
        Ok(self)
    }

    pub fn remove_attr(&self, name: &str) -> Result<&Self> {
        self.each(|host, node| host.remove_attribute(node, name))
    }

    // ---- dataset --------------------------------------------------------------

    /// Dataset entry, empty when absent
    pub fn data(&self, key: &str) -> Result<String> {
        let node = self.single("get dataset")?;
        Ok(self.dom.host().data(node, key)?.unwrap_or_default())
    }

    pub fn set_data(&self, key: &str, value: &str) -> Result<&Self> {
        self.set_data_map(&[(key, value)])
    }

    pub fn set_data_map(&self, entries: &[(&str, &str)]) -> Result<&Self> {
        for (key, value) in entries {
            self.each(|host, node| host.set_data(node, key, value))?;
        }
        Ok(self)
    }

    /// Remove the named dataset entries, or all of them when `keys` is empty
    pub fn remove_data(&self, keys: &[&str]) -> Result<&Self> {
        self.each(|host, node| {
            for key in host.data_keys(node)? {
                if keys.is_empty() || keys.contains(&key.as_str()) {
                    host.remove_data(node, &key)?;
                }
            }
            Ok(())
        })
    }

    // ---- inline style ---------------------------------------------------------

    /// Inline style value, empty when unset
    pub fn css(&self, property: &str) -> Result<String> {
        let node = self.single("get styles")?;
        Ok(self.dom.host().style(node, property)?)
    }

    pub fn set_css(&self, property: &str, value: &str) -> Result<&Self> {
        self.set_css_map(&[(property, value)])
    }

    pub fn set_css_map(&self, styles: &[(&str, &str)]) -> Result<&Self> {
        for (property, value) in styles {
            self.each(|host, node| host.set_style(node, property, value))?;
        }
        Ok(self)
    }
}

impl<H: Host> Clone for Wrapper<'_, H> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom,
            selection: self.selection.clone(),
        }
    }
}

impl<H: Host> fmt::Debug for Wrapper<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("selection", &self.selection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{Document, DomError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dom_with(markup: &str) -> Dom<Document> {
        Dom::new(Document::from_html(markup).unwrap())
    }

    #[test]
    fn test_single_target_only() {
        let dom = dom_with("<p>a</p><p>b</p>");
        let ps = dom.all("p").unwrap();

        let err = ps.html().unwrap_err();
        assert_eq!(err.to_string(), "can't get innerHTML of multiple nodes");
        assert!(matches!(ps.find("b"), Err(QueryError::MultipleNodes { .. })));
        assert!(matches!(ps.click(), Err(QueryError::MultipleNodes { .. })));
        assert!(matches!(ps.clone_node(true), Err(QueryError::MultipleNodes { .. })));
        assert!(matches!(ps.append("<b></b>"), Err(QueryError::MultipleNodes { .. })));
        assert!(matches!(ps.attr("id"), Err(QueryError::MultipleNodes { .. })));

        // A one-member collection is still a collection
        let one = dom.select_all(&["p:first-child".into()]).unwrap();
        assert_eq!(one.len(), 1);
        assert!(matches!(one.text(), Err(QueryError::MultipleNodes { .. })));
    }

    #[test]
    fn test_chained_setters() {
        let dom = dom_with("<ul><li>a</li><li>b</li></ul>");
        let items = dom.all("li").unwrap();

        items
            .add_class(&["x", "y"])
            .unwrap()
            .set_attr("title", "t")
            .unwrap()
            .set_css("fontWeight", "bold")
            .unwrap();

        for &node in items.nodes() {
            let li = dom.wrap(Selection::Single(node));
            assert_eq!(li.attr("class").unwrap().as_deref(), Some("x y"));
            assert_eq!(li.attr("title").unwrap().as_deref(), Some("t"));
            assert_eq!(li.css("font-weight").unwrap(), "bold");
        }
    }

    #[test]
    fn test_remove_class_and_data() {
        let dom = dom_with("<div class=\"a b\" data-one=\"1\" data-two-words=\"2\"></div>");
        let div = dom.one("div").unwrap().unwrap();

        div.remove_class(&["a"]).unwrap();
        assert_eq!(div.attr("class").unwrap().as_deref(), Some("b"));
        div.remove_class(&[]).unwrap();
        assert_eq!(div.attr("class").unwrap().as_deref(), Some(""));

        assert_eq!(div.data("twoWords").unwrap(), "2");
        assert_eq!(div.data("foo").unwrap(), "");
        // Attribute-style keys name no dataset entry
        assert_eq!(div.data("two-words").unwrap(), "");
        assert!(matches!(
            div.set_data("two-words", "x"),
            Err(QueryError::Dom(DomError::InvalidDataKey(_)))
        ));
        div.remove_data(&["one", "nope"]).unwrap();
        assert_eq!(div.data("one").unwrap(), "");
        div.remove_data(&[]).unwrap();
        assert_eq!(div.html().unwrap(), "");
        assert_eq!(dom.host().outer_html(div.node().unwrap()).unwrap(), "<div class=\"\"></div>");
    }

    #[test]
    fn test_insert_content() {
        let dom = dom_with("<ul id=\"list\"><li>m</li></ul><p id=\"p\">p</p>");
        let list = dom.one("#list").unwrap().unwrap();

        list.append("<li>z</li>").unwrap().prepend("<li>a</li>").unwrap();
        assert_eq!(list.html().unwrap(), "<li>a</li><li>m</li><li>z</li>");

        // Existing nodes move
        let p = dom.one("#p").unwrap().unwrap();
        list.before(&p).unwrap();
        assert_eq!(
            dom.host().inner_html(dom.host().root()).unwrap(),
            "<p id=\"p\">p</p><ul id=\"list\"><li>a</li><li>m</li><li>z</li></ul>"
        );

        // Collections keep their order
        let fresh = dom.fragment("<li>1</li><li>2</li>").unwrap();
        list.append(&fresh).unwrap();
        assert_eq!(list.html().unwrap(), "<li>a</li><li>m</li><li>z</li><li>1</li><li>2</li>");

        // A lone text node has no insertion rule
        let loose = dom.host_mut().parse_fragment("loose").unwrap()[0];
        list.after(&Selection::Single(loose)).unwrap();
        assert!(dom.host().node(loose).unwrap().parent_id.is_none());
    }

    #[test]
    fn test_click_and_unbind() {
        let dom = dom_with("<div><button>go</button></div>");
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        dom.one("div").unwrap().unwrap().on_click(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }).unwrap();

        let button = dom.one("button").unwrap().unwrap();
        button.click().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        dom.one("div").unwrap().unwrap().off_click().unwrap();
        button.click().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone_and_remove() {
        let dom = dom_with("<div id=\"a\"><span>s</span></div>");
        let div = dom.one("#a").unwrap().unwrap();

        let copy = div.clone_node(true).unwrap();
        assert_eq!(copy.html().unwrap(), "<span>s</span>");
        assert_eq!(div.clone_node(false).unwrap().html().unwrap(), "");

        div.remove().unwrap().remove().unwrap();
        assert!(dom.one("#a").unwrap().is_none());
        // Removed nodes stay usable
        assert_eq!(div.text().unwrap(), "s");
    }

    #[test]
    fn test_collection_content() {
        let dom = dom_with("<div><b>1</b></div><div><i>2</i></div>");
        let divs = dom.all("div").unwrap();

        divs.set_html("<span>s</span>").unwrap();
        assert_eq!(
            dom.host().inner_html(dom.host().root()).unwrap(),
            "<div><span>s</span></div><div><span>s</span></div>"
        );

        divs.empty().unwrap();
        assert_eq!(
            dom.host().inner_html(dom.host().root()).unwrap(),
            "<div></div><div></div>"
        );
        assert!(dom.one("span").unwrap().is_none());
    }

    #[test]
    fn test_multi_pair_setters() {
        let dom = dom_with("<p>a</p><p>b</p>");
        let ps = dom.all("p").unwrap();

        ps.set_attrs(&[("title", "t"), ("lang", "en")])
            .unwrap()
            .set_data_map(&[("userId", "7"), ("role", "admin")])
            .unwrap()
            .set_css_map(&[("color", "red"), ("marginTop", "1px")])
            .unwrap();

        for &node in ps.nodes() {
            assert_eq!(
                dom.host().outer_html(node).unwrap().split('>').next().unwrap(),
                "<p title=\"t\" lang=\"en\" data-user-id=\"7\" data-role=\"admin\" \
                 style=\"color: red; margin-top: 1px;\""
            );
            let p = dom.wrap(Selection::Single(node));
            assert_eq!(p.data("role").unwrap(), "admin");
            assert_eq!(p.css("margin-top").unwrap(), "1px");
        }
    }

    #[test]
    fn test_insert_collection_order() {
        let dom = dom_with("<ul><li id=\"m\">m</li></ul>");
        let m = dom.one("#m").unwrap().unwrap();
        let list = dom.one("ul").unwrap().unwrap();

        list.prepend(&dom.fragment("<li>1</li><li>2</li>").unwrap())
            .unwrap();
        m.before(&dom.fragment("<li>3</li><li>4</li>").unwrap())
            .unwrap()
            .after(&dom.fragment("<li>5</li><li>6</li>").unwrap())
            .unwrap();

        assert_eq!(
            list.html().unwrap(),
            "<li>1</li><li>2</li><li>3</li><li>4</li><li id=\"m\">m</li><li>5</li><li>6</li>"
        );
    }

    #[test]
    fn test_text_node_takes_no_children() {
        let dom = dom_with("<p>hi</p>");
        let p = dom.one("p").unwrap().unwrap();
        let text = dom
            .host()
            .node(p.node().unwrap())
            .unwrap()
            .children_ids[0];
        let wrapped = dom.select(&[Arg::Node(text)]).unwrap().unwrap();

        assert!(matches!(
            wrapped.set_html("<b>x</b>"),
            Err(QueryError::Dom(DomError::InvalidNodeType { .. }))
        ));
        assert!(matches!(
            wrapped.append("<b>x</b>"),
            Err(QueryError::Dom(DomError::InvalidNodeType { .. }))
        ));
        assert_eq!(p.html().unwrap(), "hi");
    }
}
