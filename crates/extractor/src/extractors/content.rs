// ABOUTME: Selector-driven article extraction over a parsed HTML document.
// ABOUTME: Primary extraction uses the site rule with first-match container priority; fallback scans body children.

//! Article body extraction.
//!
//! Output is a sequence of fragments, one per line:
//! - `<p>…</p>` for text-div matches and paragraphs (trimmed text),
//! - `<li>…</li>` for list items with their label text removed,
//! - the verbatim outer HTML of tables.
//!
//! Key behaviors:
//! - Text-div matches are collected over the whole document, before anything else.
//! - Container selectors are tried in order; only the first one with at least
//!   one match is used, and the others are never consulted.
//! - When the rule yields nothing, only the direct children of `<body>` are
//!   considered (paragraphs and tables).

use std::collections::HashSet;

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::compiled::{CompiledRule, CompiledSelector};

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("static selector"));

/// Runs primary extraction, then fallback if primary produced nothing.
///
/// The result is trimmed; an empty string means no extractable content.
pub fn extract_document(doc: &Html, rule: &CompiledRule) -> String {
    let mut content = extract_primary(doc, rule);
    if content.is_empty() {
        tracing::debug!("no content in configured containers, scanning body");
        content = extract_fallback(doc);
    }
    content.trim().to_string()
}

/// Applies the site rule: text-div matches, then the first matching container.
pub fn extract_primary(doc: &Html, rule: &CompiledRule) -> String {
    let mut out = String::new();

    if let Some(text_div) = &rule.text_div {
        for el in doc.select(text_div.selector()) {
            append_text(&mut out, &element_text(el), "p");
        }
    }

    for container_sel in &rule.containers {
        let containers: Vec<ElementRef> = doc.select(container_sel.selector()).collect();
        if containers.is_empty() {
            continue;
        }
        tracing::debug!(
            container = container_sel.css(),
            matches = containers.len(),
            "container selected"
        );

        if let Some(paragraph) = &rule.paragraph {
            for el in select_within(&containers, paragraph.selector()) {
                append_text(&mut out, &element_text(el), "p");
            }
        }
        if let Some(list_item) = &rule.list_item {
            for el in select_within(&containers, list_item.selector()) {
                append_text(&mut out, &clean_list_item(el, rule.list_label.as_ref()), "li");
            }
        }
        if let Some(table) = &rule.table {
            for el in select_within(&containers, table.selector()) {
                append_html(&mut out, el);
            }
        }
        break;
    }

    out
}

/// Scans the direct element children of `<body>` for paragraphs and tables.
pub fn extract_fallback(doc: &Html) -> String {
    let mut out = String::new();

    let Some(body) = doc.select(&BODY_SELECTOR).next() else {
        return out;
    };

    for child in body.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "p" => append_text(&mut out, &element_text(child), "p"),
            "table" => append_html(&mut out, child),
            _ => {}
        }
    }

    out
}

/// Descendants of any container matching `selector`, deduplicated, in container order.
fn select_within<'a>(containers: &[ElementRef<'a>], selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut found = Vec::new();
    for container in containers {
        for el in container.select(selector) {
            if el.id() == container.id() {
                continue;
            }
            if seen.insert(el.id()) {
                found.push(el);
            }
        }
    }
    found
}

fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

/// Item text with the first occurrence of each nested label's text removed.
fn clean_list_item(item: ElementRef, label: Option<&CompiledSelector>) -> String {
    let mut text = element_text(item).trim().to_string();
    let Some(label) = label else {
        return text;
    };

    for el in item.select(label.selector()) {
        if el.id() == item.id() {
            continue;
        }
        let label_text = element_text(el);
        let label_text = label_text.trim();
        if !label_text.is_empty() {
            text = text.replacen(label_text, "", 1);
        }
    }
    text
}

fn append_text(out: &mut String, text: &str, tag: &str) {
    let text = text.trim();
    if !text.is_empty() {
        out.push_str(&format!("<{tag}>{text}</{tag}>\n"));
    }
}

fn append_html(out: &mut String, el: ElementRef) {
    out.push_str(&el.html());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::rules::SiteRule;
    use pretty_assertions::assert_eq;

    fn compile(rule: SiteRule) -> CompiledRule {
        CompiledRule::compile("site.test", &rule).unwrap()
    }

    fn full_rule(containers: &[&str]) -> CompiledRule {
        compile(SiteRule {
            content_selectors: containers.iter().map(|s| s.to_string()).collect(),
            paragraph_selector: "p".to_string(),
            text_div_selector: "div.lead".to_string(),
            table_selector: "table".to_string(),
            list_item_selector: "li".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn two_paragraphs_in_container() {
        let doc = Html::parse_document(
            r#"<html><body><div class="body"><p>Hello</p><p> World </p></div></body></html>"#,
        );
        let rule = full_rule(&["div.body"]);
        assert_eq!(extract_document(&doc, &rule), "<p>Hello</p>\n<p>World</p>");
    }

    #[test]
    fn first_matching_container_wins() {
        let doc = Html::parse_document(
            r#"<body>
                <div class="a"><p>from A</p></div>
                <div class="b"><p>from B</p></div>
            </body>"#,
        );
        let rule = full_rule(&["div.a", "div.b"]);
        assert_eq!(extract_document(&doc, &rule), "<p>from A</p>");
    }

    #[test]
    fn empty_container_selector_falls_through_to_next() {
        let doc = Html::parse_document(
            r#"<body>
                <p>outside</p>
                <div class="b"><p>from B</p></div>
            </body>"#,
        );
        let rule = full_rule(&["div.missing", "div.b"]);
        assert_eq!(extract_document(&doc, &rule), "<p>from B</p>");
    }

    #[test]
    fn matched_container_without_content_does_not_try_later_selectors() {
        let doc = Html::parse_document(
            r#"<body>
                <div class="a"><span>nothing here</span></div>
                <div class="b"><p>from B</p></div>
                <p>direct child</p>
            </body>"#,
        );
        let rule = full_rule(&["div.a", "div.b"]);
        // A matched but yielded nothing, so the fallback runs instead of B.
        assert_eq!(extract_document(&doc, &rule), "<p>direct child</p>");
    }

    #[test]
    fn text_div_fragments_come_first_and_ignore_containers() {
        let doc = Html::parse_document(
            r#"<body>
                <div class="body"><p>Para</p><ul><li>Item</li></ul></div>
                <div class="lead"> Lead text </div>
                <div class="lead">   </div>
            </body>"#,
        );
        let rule = full_rule(&["div.body"]);
        assert_eq!(
            extract_document(&doc, &rule),
            "<p>Lead text</p>\n<p>Para</p>\n<li>Item</li>"
        );
    }

    #[test]
    fn fragments_are_grouped_paragraphs_lists_tables() {
        let doc = Html::parse_document(
            r#"<body><div class="body">
                <table><tr><td>cell</td></tr></table>
                <ul><li>one</li></ul>
                <p>para</p>
            </div></body>"#,
        );
        let rule = full_rule(&["div.body"]);
        let table_html = doc
            .select(&Selector::parse("table").unwrap())
            .next()
            .unwrap()
            .html();

        assert_eq!(
            extract_document(&doc, &rule),
            format!("<p>para</p>\n<li>one</li>\n{table_html}")
        );
    }

    #[test]
    fn table_markup_is_verbatim_and_reparses() {
        let doc = Html::parse_document(
            r#"<body><div class="body"><table class="data"><tr><th>Year</th><td colspan="2">2024</td></tr></table></div></body>"#,
        );
        let rule = full_rule(&["div.body"]);
        let table_sel = Selector::parse("table").unwrap();
        let original = doc.select(&table_sel).next().unwrap().html();

        let content = extract_document(&doc, &rule);
        assert_eq!(content, original);

        let reparsed = Html::parse_fragment(&content);
        let table = reparsed.select(&table_sel).next().unwrap();
        assert_eq!(table.value().attr("class"), Some("data"));
        let cell = reparsed
            .select(&Selector::parse("td[colspan='2']").unwrap())
            .next()
            .unwrap();
        assert_eq!(cell.text().collect::<String>(), "2024");
    }

    #[test]
    fn list_label_removed_once() {
        let doc = Html::parse_document(
            r#"<body><div class="body"><ul>
                <li><span class="article__list-label">BREAKING: </span>Storm hits, BREAKING: again</li>
            </ul></div></body>"#,
        );
        let rule = full_rule(&["div.body"]);
        assert_eq!(
            extract_document(&doc, &rule),
            "<li>Storm hits, BREAKING: again</li>"
        );
    }

    #[test]
    fn list_item_with_only_label_is_dropped() {
        let doc = Html::parse_document(
            r#"<body><div class="body"><ul>
                <li><b class="article__list-label">1.</b></li>
                <li>kept</li>
            </ul></div></body>"#,
        );
        let rule = full_rule(&["div.body"]);
        assert_eq!(extract_document(&doc, &rule), "<li>kept</li>");
    }

    #[test]
    fn custom_list_label_selector() {
        let doc = Html::parse_document(
            r#"<body><main><ol><li><em class="num">#1</em> First</li></ol></main></body>"#,
        );
        let rule = compile(SiteRule {
            content_selectors: vec!["main".to_string()],
            list_item_selector: "li".to_string(),
            list_label_selector: "em.num".to_string(),
            ..Default::default()
        });
        assert_eq!(extract_document(&doc, &rule), "<li>First</li>");
    }

    #[test]
    fn nested_containers_do_not_duplicate_paragraphs() {
        let doc = Html::parse_document(
            r#"<body><div class="c"><div class="c"><p>once</p></div></div></body>"#,
        );
        let rule = full_rule(&["div.c"]);
        assert_eq!(extract_document(&doc, &rule), "<p>once</p>");
    }

    #[test]
    fn fallback_uses_only_direct_body_children() {
        let doc = Html::parse_document(
            r#"<html><body>
                <p> top </p>
                <div><div><p>two levels deep</p></div></div>
                <ul><li>ignored</li></ul>
                <table><tr><td>t</td></tr></table>
                <p></p>
            </body></html>"#,
        );
        let rule = full_rule(&["article"]);
        let table_html = doc
            .select(&Selector::parse("table").unwrap())
            .next()
            .unwrap()
            .html();

        assert_eq!(
            extract_document(&doc, &rule),
            format!("<p>top</p>\n{table_html}")
        );
    }

    #[test]
    fn nothing_extractable_is_empty() {
        let doc = Html::parse_document("<html><body><div>just a div</div></body></html>");
        let rule = full_rule(&["article"]);
        assert_eq!(extract_primary(&doc, &rule), "");
        assert_eq!(extract_document(&doc, &rule), "");
    }

    #[test]
    fn rule_without_selectors_goes_straight_to_fallback() {
        let doc = Html::parse_document("<body><p>plain</p></body>");
        let rule = compile(SiteRule::default());
        assert_eq!(extract_document(&doc, &rule), "<p>plain</p>");
    }
}
