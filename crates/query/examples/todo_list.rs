//! Todo list example - build a list, tag items and react to clicks

use dom::Document;
use query::{Dom, Selection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let dom = Dom::new(Document::from_html(
        "<section id=\"app\"><h1>Todo</h1><ul class=\"todos\"></ul><button id=\"clear\">Clear</button></section>",
    )?);

    let list = dom.one("ul.todos")?.ok_or("missing list")?;
    for task in ["write parser", "write selector engine", "ship it"] {
        let item = dom.fragment("<li class=\"todo\"></li>")?;
        item.set_text(task)?.set_data("state", "open")?;
        list.append(&item)?;
    }

    // Mark the first item done
    list.find("li")?
        .ok_or("empty list")?
        .add_class(&["done"])?
        .set_data("state", "done")?
        .set_css("textDecoration", "line-through")?;

    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    dom.one("#clear")?
        .ok_or("missing button")?
        .on_click(move |event| {
            counter.fetch_add(1, Ordering::SeqCst);
            println!("Clicked node {}", event.target);
        })?;
    dom.one("#clear")?.ok_or("missing button")?.click()?;

    let done = dom.all("li.done")?;
    println!("Done items: {}", done.len());
    for &node in dom.all("li")?.nodes() {
        let item = dom.wrap(Selection::Single(node));
        println!("- {} [{}]", item.text()?, item.data("state")?);
    }

    println!("Clicks: {}", clicks.load(Ordering::SeqCst));
    println!("{}", dom.one("#app")?.ok_or("missing app")?.html()?);
    Ok(())
}
