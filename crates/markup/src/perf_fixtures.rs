pub const BLOCK_TEMPLATE: &str =
    "<div class=box  data-x='1'><span>hello</span><img src=x><script>if (a<b) {}</script></div>\n";

pub fn make_blocks(blocks: usize) -> String {
    let mut html = String::with_capacity(BLOCK_TEMPLATE.len() * blocks);
    for _ in 0..blocks {
        html.push_str(BLOCK_TEMPLATE);
    }
    html
}

/// `depth` nested `<div>`s around a single text node, closed properly.
pub fn make_nested(depth: usize) -> String {
    let mut html = String::with_capacity(depth * 11 + 1);
    for _ in 0..depth {
        html.push_str("<div>");
    }
    html.push('x');
    for _ in 0..depth {
        html.push_str("</div>");
    }
    html
}
