use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dom::{Document, SelectorList};

fn build_page(rows: usize) -> String {
    let mut markup = String::from("<div id=\"app\"><ul class=\"list\">");
    for i in 0..rows {
        markup.push_str(&format!(
            "<li class=\"item{}\" data-index=\"{}\"><span>row {}</span><a href=\"#{}\">open</a></li>",
            if i % 2 == 0 { " even" } else { "" },
            i,
            i,
            i
        ));
    }
    markup.push_str("</ul></div>");
    markup
}

fn bench_parse(c: &mut Criterion) {
    let markup = build_page(1000);
    c.bench_function("parse 1000 rows", |b| {
        b.iter(|| Document::from_html(black_box(&markup)).unwrap())
    });
}

fn bench_query(c: &mut Criterion) {
    let document = Document::from_html(&build_page(1000)).unwrap();
    let root = document.root();

    c.bench_function("query descendant combinator", |b| {
        b.iter(|| {
            document
                .query_selector_all(root, black_box("#app li.even > span"))
                .unwrap()
        })
    });

    c.bench_function("query attribute prefix", |b| {
        b.iter(|| {
            document
                .query_selector_all(root, black_box("a[href^='#9']"))
                .unwrap()
        })
    });

    c.bench_function("parse selector list", |b| {
        b.iter(|| SelectorList::parse(black_box("ul > li:nth-child(2n+1):not(.even), a[href]")).unwrap())
    });
}

criterion_group!(benches, bench_parse, bench_query);
criterion_main!(benches);
