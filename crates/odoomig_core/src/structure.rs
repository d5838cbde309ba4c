//! Renames `<tree>` view tags to `<list>` and updates `view_mode` values.
//!
//! Purely textual: the substitutions also fire inside comments or unrelated
//! text that happens to contain the patterns. That matches the legacy
//! migration behavior and is intentional.

use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::filesystem;

static TREE_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<tree(.*?)>").unwrap());
static VIEW_MODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<field name="view_mode">([^<]*)</field>"#).unwrap());

pub fn transform(content: &str) -> Option<String> {
    let mut updated = TREE_OPEN_RE.replace_all(content, "<list${1}>").into_owned();
    updated = updated.replace("</tree>", "</list>");
    updated = VIEW_MODE_RE
        .replace_all(&updated, |caps: &Captures| {
            format!(
                r#"<field name="view_mode">{}</field>"#,
                caps[1].replace("tree", "list")
            )
        })
        .into_owned();
    (updated != content).then_some(updated)
}

pub fn run(root: &Path) -> Result<Vec<PathBuf>> {
    filesystem::rewrite_files(root, "xml", transform)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn renames_tree_tags_and_keeps_attributes() {
        let input = r#"<tree string="Orders" editable="bottom"><field name="name"/></tree>"#;
        let output = transform(input).expect("changed");
        assert_eq!(
            output,
            r#"<list string="Orders" editable="bottom"><field name="name"/></list>"#
        );
        assert!(!output.contains("<tree"));
    }

    #[test]
    fn renames_bare_tree_tags() {
        let output = transform("<tree><field name='name'/></tree>").expect("changed");
        assert_eq!(output, "<list><field name='name'/></list>");
    }

    #[test]
    fn rewrites_view_mode_text_only() {
        let input = r#"<field name="view_mode">tree,form</field>"#;
        let output = transform(input).expect("changed");
        assert_eq!(output, r#"<field name="view_mode">list,form</field>"#);
    }

    #[test]
    fn unrelated_content_is_unchanged() {
        assert_eq!(transform(r#"<form><field name="street"/></form>"#), None);
    }

    #[test]
    fn second_pass_is_idempotent() {
        let once = transform("<tree limit=\"80\"/>x</tree>").expect("changed");
        assert_eq!(transform(&once), None);
    }

    #[test]
    fn run_rewrites_files_in_place_and_skips_clean_ones() {
        let temp = tempdir().expect("tempdir");
        let view = temp.path().join("view.xml");
        let clean = temp.path().join("clean.xml");
        fs::write(&view, "<tree><field name='state'/></tree>").expect("write");
        fs::write(&clean, "<form/>").expect("write");

        let changed = run(temp.path()).expect("run");
        assert_eq!(changed, vec![view.clone()]);
        assert_eq!(
            fs::read_to_string(&view).expect("read"),
            "<list><field name='state'/></list>"
        );
        assert_eq!(fs::read_to_string(&clean).expect("read"), "<form/>");
    }
}
