//! Removal of Markdown code fences from raw model responses.
//!
//! Models often wrap the whole document in a fenced block (```` ```html ````
//! ... ```` ``` ````). The fence and its language tag are discarded; the tag
//! is never validated or surfaced.

const FENCE: &str = "```";

/// Strip one leading fence opener and one trailing fence closer, then trim.
///
/// The opener is three backticks, an optional alphabetic language tag and an
/// optional line break. The closer is an optional line break followed by three
/// backticks. When only one of the two is present, only that one is removed.
///
/// The result is a fixed point: `sanitize(&sanitize(s)) == sanitize(s)` for
/// every input. Fences nested directly inside the outer pair are peeled in the
/// same call so a second pass never finds anything left to strip.
///
/// # Example
/// ```
/// use devalchemy::sanitize;
/// assert_eq!(sanitize("```html\n<p>hi</p>\n```"), "<p>hi</p>");
/// assert_eq!(sanitize("<p>hi</p>"), "<p>hi</p>");
/// ```
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = strip_once(current);
        if next.len() == current.len() {
            return current.to_string();
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let text = strip_opener(text);
    let text = strip_closer(text);
    text.trim()
}

fn strip_opener(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}

fn strip_closer(text: &str) -> &str {
    let Some(rest) = text.strip_suffix(FENCE) else {
        return text;
    };
    rest.strip_suffix("\r\n")
        .or_else(|| rest.strip_suffix('\n'))
        .unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence_pair() {
        assert_eq!(sanitize("```html\n<p>hi</p>\n```"), "<p>hi</p>");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(sanitize("<p>hi</p>"), "<p>hi</p>");
        assert_eq!(sanitize("  \n<p>hi</p>\n\n"), "<p>hi</p>");
    }

    #[test]
    fn strips_untagged_opener_and_inline_closer() {
        assert_eq!(sanitize("```\n<div></div>```"), "<div></div>");
    }

    #[test]
    fn strips_only_the_fence_that_is_present() {
        assert_eq!(sanitize("```css\nbody { margin: 0; }"), "body { margin: 0; }");
        assert_eq!(sanitize("body { margin: 0; }\n```"), "body { margin: 0; }");
    }

    #[test]
    fn handles_crlf_line_breaks() {
        assert_eq!(sanitize("```html\r\n<p>x</p>\r\n```"), "<p>x</p>");
    }

    #[test]
    fn interior_fences_are_kept() {
        let doc = "<pre>\n```\ncode\n```\n</pre>";
        assert_eq!(sanitize(doc), doc);
    }

    #[test]
    fn fence_only_input_becomes_empty() {
        assert_eq!(sanitize("```"), "");
        assert_eq!(sanitize("```html\n```"), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "",
            "```",
            "``````",
            "```html\n<p>hi</p>\n```",
            "```\n<div></div>```",
            "  ```js\nlet a = 1;\n```  ",
            "```html\n```html\n<p>nested</p>\n```\n```",
            "```html\n<p>open only</p>",
            "<p>close only</p>```",
            "plain text",
            "\n\n```\n\n```\n\n",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
            assert!(!once.starts_with(FENCE), "residual opener for {input:?}");
            assert!(!once.ends_with(FENCE), "residual closer for {input:?}");
        }
    }
}
