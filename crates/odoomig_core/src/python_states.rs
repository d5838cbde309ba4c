//! Strips deprecated `states={...}` keyword arguments from Python field
//! declarations.

use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filesystem;

static FIELD_STATES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"states\s*=\s*\{[^}]*\},?").unwrap());

pub fn transform(content: &str) -> Option<String> {
    let updated = FIELD_STATES_RE.replace_all(content, "");
    (updated != content).then(|| updated.into_owned())
}

pub fn run(root: &Path) -> Result<Vec<PathBuf>> {
    filesystem::rewrite_files(root, "py", transform)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn states_kwarg_and_trailing_comma_are_removed() {
        let input = "name = fields.Char(states = {'draft': [('readonly', False)]},required=True)";
        let output = transform(input).expect("changed");
        assert_eq!(output, "name = fields.Char(required=True)");
    }

    #[test]
    fn multiline_states_dict_is_removed() {
        let input = "date = fields.Date(\n    states={'draft': [('readonly', False)],\n            'done': [('readonly', True)]},\n    tracking=True,\n)";
        let output = transform(input).expect("changed");
        assert!(!output.contains("states"));
        assert!(output.contains("tracking=True"));
    }

    #[test]
    fn files_without_states_are_unchanged() {
        assert_eq!(transform("name = fields.Char(required=True)"), None);
    }

    #[test]
    fn second_pass_is_idempotent() {
        let once = transform("x = fields.Char(states={'done': []})").expect("changed");
        assert_eq!(transform(&once), None);
    }

    #[test]
    fn run_only_touches_python_files() {
        let temp = tempdir().expect("tempdir");
        let model = temp.path().join("model.py");
        let view = temp.path().join("view.xml");
        fs::write(&model, "a = fields.Char(states={'draft': []})").expect("write");
        fs::write(&view, "states={'draft': []}").expect("write");

        let changed = run(temp.path()).expect("run");
        assert_eq!(changed, vec![model.clone()]);
        assert_eq!(fs::read_to_string(&model).expect("read"), "a = fields.Char()");
        assert_eq!(
            fs::read_to_string(&view).expect("read"),
            "states={'draft': []}"
        );
    }
}
