use html_parser::{parse, Parser};

fn main() {
    divan::main();
}

// a mid-sized document exercising text, attributes, entities, tables,
// and formatting elements
fn sample_document() -> String {
    let mut html = String::from(
        "<!doctype html><html><head><title>Sample &amp; sundry</title>\
         <meta charset=\"utf-8\"><style>p { color: red; }</style></head><body>",
    );
    for i in 0..200 {
        html.push_str(&format!(
            "<div class=\"row r{i}\"><h2 id=\"h{i}\">Heading {i}</h2>\
             <p>Paragraph <b>one</b> &lt;with&gt; <i>nested <b>formatting</b></i> text.</p>"
        ));
        html.push_str("<table><tr><td>a</td><td>b</td></tr><tr><td colspan=2>c</td></tr></table>");
        html.push_str("<ul><li>One<li>Two<li>Three</ul></div>");
    }
    html.push_str("</body></html>");
    html
}

#[divan::bench(skip_ext_time = true)]
fn bench_html_parse(bencher: divan::Bencher) {
    let html = sample_document();
    bencher.bench(|| parse(&html, ""));
}

#[divan::bench(skip_ext_time = true)]
fn bench_html_parse_tracking(bencher: divan::Bencher) {
    let html = sample_document();
    bencher.bench(|| {
        let mut parser = Parser::html_parser();
        parser.set_track_errors(100).set_track_position(true);
        parser.parse_input(&html, "")
    });
}

#[divan::bench(skip_ext_time = true)]
fn bench_serialize(bencher: divan::Bencher) {
    let doc = parse(&sample_document(), "");
    bencher.bench(|| doc.html());
}
