use dom::Document;
use query::Dom;
use std::sync::{Arc, Mutex};

#[test]
fn test_click_bubbles_through_bound_collection() {
    let dom = Dom::new(
        Document::from_html("<ul><li><a id=\"a\">a</a></li><li><a id=\"b\">b</a></li></ul>").unwrap(),
    );
    let log = Arc::new(Mutex::new(Vec::new()));

    let sink = log.clone();
    dom.all("li")
        .unwrap()
        .on_click(move |event| sink.lock().unwrap().push(event.current_target))
        .unwrap();

    let a = dom.one("#a").unwrap().unwrap();
    a.click().unwrap();

    let first_li = dom.one("li").unwrap().unwrap().node().unwrap();
    assert_eq!(*log.lock().unwrap(), vec![first_li]);
}

#[test]
fn test_disabled_button_ignores_click() {
    let dom = Dom::new(Document::from_html("<form><button disabled>x</button></form>").unwrap());
    let hits = Arc::new(Mutex::new(0));

    let counter = hits.clone();
    dom.one("form")
        .unwrap()
        .unwrap()
        .on_click(move |_| *counter.lock().unwrap() += 1)
        .unwrap();

    dom.one("button").unwrap().unwrap().click().unwrap();
    assert_eq!(*hits.lock().unwrap(), 0);

    dom.one("button").unwrap().unwrap().remove_attr("disabled").unwrap().click().unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn test_clones_do_not_carry_listeners() {
    let dom = Dom::new(Document::from_html("<p>x</p>").unwrap());
    let hits = Arc::new(Mutex::new(0));

    let counter = hits.clone();
    let p = dom.one("p").unwrap().unwrap();
    p.on_click(move |_| *counter.lock().unwrap() += 1).unwrap();

    p.clone_node(true).unwrap().click().unwrap();
    assert_eq!(*hits.lock().unwrap(), 0);
    p.click().unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
}
