//! Collapses the legacy chatter `<div>` block into the `<chatter/>` tag.
//!
//! The match runs to the nearest `</div>`, so a chatter block containing
//! nested divs is closed early. That mirrors the legacy migration; nested
//! chatter content has no documented intended behavior.

use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filesystem;

static CHATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="oe_chatter">.*?</div>"#).unwrap());

pub fn transform(content: &str) -> Option<String> {
    let updated = CHATTER_RE.replace_all(content, "<chatter/>");
    (updated != content).then(|| updated.into_owned())
}

pub fn run(root: &Path) -> Result<Vec<PathBuf>> {
    filesystem::rewrite_files(root, "xml", transform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chatter_block_becomes_single_tag() {
        let input = r#"<div class="oe_chatter"><field name="message_ids"/></div>"#;
        assert_eq!(transform(input).expect("changed"), "<chatter/>");
    }

    #[test]
    fn matches_across_newlines() {
        let input = "<form>\n  <div class=\"oe_chatter\">\n    <field name=\"message_follower_ids\"/>\n    <field name=\"activity_ids\"/>\n  </div>\n</form>";
        let output = transform(input).expect("changed");
        assert_eq!(output, "<form>\n  <chatter/>\n</form>");
    }

    #[test]
    fn stops_at_nearest_closing_div() {
        // Nested divs terminate the match early; the inner closing tag wins.
        let input = r#"<div class="oe_chatter"><div class="inner"/>text</div>trailing</div>"#;
        let output = transform(input).expect("changed");
        assert_eq!(output, r#"<chatter/>trailing</div>"#);
    }

    #[test]
    fn second_pass_is_idempotent() {
        let once = transform(r#"<div class="oe_chatter"><t/></div>"#).expect("changed");
        assert_eq!(transform(&once), None);
    }

    #[test]
    fn plain_divs_are_unchanged() {
        assert_eq!(transform(r#"<div class="o_form_sheet"></div>"#), None);
    }
}
