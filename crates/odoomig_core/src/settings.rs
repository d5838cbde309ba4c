//! Restructures legacy settings-page markup into `<app>`/`<block>`/`<setting>`.
//!
//! Five rewrites applied in strict sequence over one buffer. The final two
//! replacements both target `</div>`: the first turns every remaining one
//! into `</block>`, so the second (`</div>` into `</app>`) finds nothing.
//! The legacy migration did exactly this; the order is kept rather than
//! second-guessed.

use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filesystem;

static APP_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<div class="app_settings_block[^>]*>"#).unwrap());
static BLOCK_TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h2>(.*?)</h2>").unwrap());
static LABEL_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="row.*?o_settings_container">\s*<label[^>]*for="(.*?)".*?</div>"#)
        .unwrap()
});
static FIELD_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<div class="row.*?o_settings_container[^>]*>\s*<field[^>]*name="(.*?)"[^>]*/>\s*</div>"#,
    )
    .unwrap()
});

pub fn transform(content: &str) -> Option<String> {
    let mut updated = APP_OPEN_RE.replace_all(content, "<app>").into_owned();
    updated = BLOCK_TITLE_RE
        .replace_all(&updated, r#"<block title="${1}">"#)
        .into_owned();
    updated = LABEL_ROW_RE.replace_all(&updated, "").into_owned();
    updated = FIELD_ROW_RE
        .replace_all(
            &updated,
            r#"<setting string="${1}"><field name="${1}"/></setting>"#,
        )
        .into_owned();
    updated = updated.replace("</div>", "</block>");
    updated = updated.replace("</div>", "</app>");
    (updated != content).then_some(updated)
}

pub fn run(root: &Path) -> Result<Vec<PathBuf>> {
    filesystem::rewrite_files(root, "xml", transform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_block_opening_tag_becomes_app() {
        let input = r#"<div class="app_settings_block" data-string="Sales" string="Sales">"#;
        assert_eq!(transform(input).expect("changed"), "<app>");
    }

    #[test]
    fn headings_become_block_titles() {
        let output = transform("<h2>Quotations</h2>").expect("changed");
        assert_eq!(output, r#"<block title="Quotations">"#);
    }

    #[test]
    fn label_rows_are_deleted() {
        let input = "<div class=\"row mt16 o_settings_container\">\n  <label string=\"Margins\" for=\"use_margins\"/>\n  <span>help text</span>\n</div>";
        let output = transform(input).expect("changed");
        assert_eq!(output, "");
    }

    #[test]
    fn field_rows_become_settings() {
        let input = r#"<div class="row mt16 o_settings_container" id="margins"><field widget="boolean_toggle" name="use_margins"/></div>"#;
        let output = transform(input).expect("changed");
        assert_eq!(
            output,
            r#"<setting string="use_margins"><field name="use_margins"/></setting>"#
        );
    }

    #[test]
    fn leftover_closing_divs_end_up_as_block() {
        // Both blanket replacements run; the second never finds a </div>
        // because the first already consumed them all.
        let input = r#"<div class="app_settings_block"><h2>Title</h2><p/></div></div>"#;
        let output = transform(input).expect("changed");
        assert_eq!(output, r#"<app><block title="Title"><p/></block></block>"#);
        assert!(!output.contains("</app>"));
    }

    #[test]
    fn unrelated_markup_is_unchanged() {
        assert_eq!(transform("<form><group/></form>"), None);
    }
}
