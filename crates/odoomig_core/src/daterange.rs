//! Normalizes the `daterange` widget options to the Odoo 18 shape.

use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filesystem;

static DATERANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"widget="daterange" options="\{[^}]*related_start_date[^}]*\}""#).unwrap()
});

const REPLACEMENT: &str = r#"widget="daterange" options="{'end_date_field': 'end_date'}""#;

pub fn transform(content: &str) -> Option<String> {
    let updated = DATERANGE_RE.replace_all(content, REPLACEMENT);
    (updated != content).then(|| updated.into_owned())
}

pub fn run(root: &Path) -> Result<Vec<PathBuf>> {
    filesystem::rewrite_files(root, "xml", transform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_options_are_replaced() {
        let input = r#"<field name="date_start" widget="daterange" options="{'related_start_date': 'date_start', 'related_end_date': 'date_end'}"/>"#;
        let output = transform(input).expect("changed");
        assert_eq!(
            output,
            r#"<field name="date_start" widget="daterange" options="{'end_date_field': 'end_date'}"/>"#
        );
    }

    #[test]
    fn options_without_related_start_date_are_kept() {
        let input = r#"<field widget="daterange" options="{'end_date_field': 'date_end'}"/>"#;
        assert_eq!(transform(input), None);
    }

    #[test]
    fn second_pass_is_idempotent() {
        let input = r#"<field widget="daterange" options="{'related_start_date': 'a'}"/>"#;
        let once = transform(input).expect("changed");
        assert_eq!(transform(&once), None);
    }
}
