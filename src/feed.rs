//! Atom 1.0 synthesis for the public feed route.

use crate::comment::PublicComment;

/// Entry titles are cut at the first word boundary at or past this many
/// characters.
const TITLE_BOUNDARY: usize = 50;

/// Renders the accepted comments of one target as an Atom document.
///
/// The feed `updated` element carries the maximum `added_at` of the
/// entries, and stays empty when there are none.
pub fn render(instance: &str, target: &str, comments: &[PublicComment]) -> String {
    let updated = comments
        .iter()
        .map(|comment| comment.added_at.as_str())
        .max()
        .unwrap_or("");

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    xml.push_str(&format!(
        "  <id>{}</id>\n",
        xml_escape(&format!("{instance}:{target}:comments"))
    ));
    xml.push_str(&format!("  <title>{}</title>\n", xml_escape(target)));
    xml.push_str(&format!("  <updated>{}</updated>\n", xml_escape(updated)));
    for comment in comments {
        push_entry(&mut xml, instance, target, comment);
    }
    xml.push_str("</feed>\n");
    xml
}

fn push_entry(xml: &mut String, instance: &str, target: &str, comment: &PublicComment) {
    xml.push_str("  <entry>\n");
    xml.push_str(&format!(
        "    <id>{}</id>\n",
        xml_escape(&format!("{instance}:{target}:comment:{}", comment.id))
    ));
    xml.push_str(&format!(
        "    <title>{}</title>\n",
        xml_escape(&entry_title(&comment.message))
    ));
    xml.push_str(&format!(
        "    <updated>{}</updated>\n",
        xml_escape(&comment.added_at)
    ));
    xml.push_str(&format!(
        "    <author><name>{}</name></author>\n",
        xml_escape(&comment.author)
    ));
    xml.push_str(&format!(
        "    <content type=\"text\">{}</content>\n",
        xml_escape(&comment.message)
    ));
    xml.push_str("  </entry>\n");
}

/// Collapses internal whitespace to single spaces and truncates at the
/// first word boundary at or after [`TITLE_BOUNDARY`] characters, never
/// mid-word.
pub fn entry_title(message: &str) -> String {
    let mut title = String::new();
    for word in message.split_whitespace() {
        if !title.is_empty() {
            title.push(' ');
        }
        title.push_str(word);
        if title.chars().count() >= TITLE_BOUNDARY {
            break;
        }
    }
    title
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
