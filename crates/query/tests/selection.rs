use dom::{Document, DomError};
use query::{Arg, Dom, QueryError, Selection};

fn list_page() -> Dom<Document> {
    Dom::new(
        Document::from_html(concat!(
            "<main id=\"root\">",
            "<h1>Todo</h1>",
            "<ol><li id=\"one\">first</li><li id=\"two\">second</li><li id=\"three\">third</li></ol>",
            "</main>"
        ))
        .unwrap(),
    )
}

#[test]
fn test_missing_parent_query_returns_none() {
    let dom = list_page();
    let root = dom.one("#root").unwrap().unwrap();

    assert!(dom.select(&[(&root).into(), "ul".into()]).unwrap().is_none());
}

#[test]
fn test_select_all_in_document_order() {
    let dom = list_page();
    let root = dom.one("#root").unwrap().unwrap();

    let items = dom.select_all(&[(&root).into(), "li".into()]).unwrap();
    assert_eq!(items.len(), 3);

    let ids: Vec<String> = items
        .nodes()
        .iter()
        .map(|&node| dom.host().attribute(node, "id").unwrap().unwrap())
        .collect();
    assert_eq!(ids, vec!["one", "two", "three"]);

    items.add_class(&["x"]).unwrap();
    for &node in items.nodes() {
        assert_eq!(dom.host().class_list(node).unwrap(), vec!["x"]);
    }
}

#[test]
fn test_explicit_flag_from_document() {
    let dom = list_page();
    let document = dom.host().root();

    assert!(dom
        .select(&[Arg::Node(document), "ul".into(), false.into()])
        .unwrap()
        .is_none());

    let items = dom
        .select_all(&[Arg::Node(document), "li".into(), true.into()])
        .unwrap();
    assert_eq!(items.len(), 3);
    items.add_class(&["x"]).unwrap();
    assert_eq!(dom.all("li.x").unwrap().nodes(), items.nodes());
}

#[test]
fn test_single_getters_match_host() {
    let dom = list_page();
    let li = dom.one("#two").unwrap().unwrap();
    let node = li.node().unwrap();

    let host = dom.host();
    assert_eq!(li.html().unwrap(), host.inner_html(node).unwrap());
    assert_eq!(li.text().unwrap(), host.text_content(node).unwrap());
    assert_eq!(li.attr("id").unwrap(), host.attribute(node, "id").unwrap());
    assert_eq!(li.val().unwrap(), host.value(node).unwrap());
    assert_eq!(li.css("color").unwrap(), host.style(node, "color").unwrap());
    assert_eq!(li.data("x").unwrap(), "");
}

#[test]
fn test_collection_setters_and_getters() {
    let dom = list_page();
    let items = dom.all("li").unwrap();

    items
        .set_text("done")
        .unwrap()
        .set_data("state", "closed")
        .unwrap()
        .set_val("v")
        .unwrap()
        .remove_attr("id")
        .unwrap();

    for &node in items.nodes() {
        let li = dom.wrap(Selection::Single(node));
        assert_eq!(li.text().unwrap(), "done");
        assert_eq!(li.data("state").unwrap(), "closed");
        assert_eq!(li.val().unwrap().as_deref(), Some("v"));
        assert_eq!(li.attr("id").unwrap(), None);
    }

    assert!(matches!(items.text(), Err(QueryError::MultipleNodes { .. })));
    assert!(matches!(items.data("state"), Err(QueryError::MultipleNodes { .. })));
    assert!(matches!(items.val(), Err(QueryError::MultipleNodes { .. })));
    assert!(matches!(items.css("color"), Err(QueryError::MultipleNodes { .. })));
    assert!(matches!(items.find_all("b"), Err(QueryError::MultipleNodes { .. })));
}

#[test]
fn test_find_is_scoped() {
    let dom = list_page();
    let list = dom.one("ol").unwrap().unwrap();

    let first = list.find("li").unwrap().unwrap();
    assert_eq!(first.text().unwrap(), "first");
    assert!(list.find("h1").unwrap().is_none());
    assert_eq!(list.find_all("main li").unwrap().len(), 3);
}

#[test]
fn test_fragment_wrappers() {
    let dom = list_page();

    let single = dom.select(&["<div>x</div>".into()]).unwrap().unwrap();
    assert!(single.node().is_some());

    let pair = dom.select(&["<div>x</div><div>y</div>".into()]).unwrap().unwrap();
    assert!(matches!(pair.selection(), Selection::Many(nodes) if nodes.len() == 2));

    // Attach the pair and the new nodes become queryable
    dom.one("main").unwrap().unwrap().append(&pair).unwrap();
    assert_eq!(dom.all("main > div").unwrap().len(), 2);
}

#[test]
fn test_invalid_inputs_surface_errors() {
    let dom = list_page();
    let li = dom.one("li").unwrap().unwrap();

    assert!(matches!(
        li.add_class(&["two words"]),
        Err(QueryError::Dom(DomError::InvalidToken(_)))
    ));
    assert!(matches!(
        li.set_data("bad-key", "v"),
        Err(QueryError::Dom(DomError::InvalidDataKey(_)))
    ));
    assert!(matches!(
        dom.select(&[Arg::Flag(true), "li".into()]),
        Err(QueryError::InvalidArgument { position: 0, .. })
    ));
    assert!(matches!(dom.all("li >"), Err(QueryError::Dom(_))));
}
