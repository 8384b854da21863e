//! Input cleanup applied once at submission time.

/// Removes every `<...>` span with at least one non-`>` character inside.
/// Remaining text is not escaped; callers embedding it into markup must
/// escape separately.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) if end > 0 => {
                rest = &after[end + 1..];
            }
            Some(_) => {
                // a bare "<>" is not a tag
                out.push_str("<>");
                rest = &after[1..];
            }
            None => {
                out.push('<');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Reduces a target identifier to `[A-Za-z0-9/_-]` and trims surrounding
/// whitespace and slashes. Retrieval matches on the normalized form, so
/// this is applied to both stored and queried targets.
pub fn normalize_target(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-'))
        .collect();

    cleaned
        .trim_matches(|c: char| c.is_whitespace() || c == '/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_tags() {
        assert_eq!(strip_tags("<b>Hi</b>"), "Hi");
        assert_eq!(strip_tags("a <em>b</em> c"), "a b c");
    }

    #[test]
    fn strips_tags_with_attributes() {
        assert_eq!(
            strip_tags("<a href=\"https://example.org\">link</a>"),
            "link"
        );
    }

    #[test]
    fn keeps_unclosed_angle_brackets() {
        assert_eq!(strip_tags("1 < 2"), "1 < 2");
        assert_eq!(strip_tags("a<>b"), "a<>b");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_tags("no markup here"), "no markup here");
    }

    #[test]
    fn normalizes_slashes_and_whitespace() {
        assert_eq!(normalize_target(" /a/b/ "), "a/b");
        assert_eq!(normalize_target("///blog/post-1///"), "blog/post-1");
    }

    #[test]
    fn drops_disallowed_characters() {
        assert_eq!(normalize_target("blog/post?.1!"), "blog/post1");
        assert_eq!(normalize_target("a b"), "ab");
    }

    #[test]
    fn valid_targets_pass_through() {
        assert_eq!(normalize_target("blog/post_1-a"), "blog/post_1-a");
    }

    #[test]
    fn degenerate_target_normalizes_to_empty() {
        assert_eq!(normalize_target(" /// "), "");
        assert_eq!(normalize_target("?!"), "");
    }
}
