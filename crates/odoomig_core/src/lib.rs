//! Migration passes that rewrite Odoo module source files (XML views and
//! Python models) from pre-18 syntax to the Odoo 18 equivalents.
//!
//! Each pass lives in its own module and exposes a pure transformation over
//! file content plus a `run` driver that walks a directory tree and writes
//! files back only when the transformation changed them. Passes are
//! independent; the binary invokes them in a fixed order.

pub mod attrs_states;
pub mod chatter;
pub mod daterange;
pub mod filesystem;
pub mod literal;
pub mod python_states;
pub mod settings;
pub mod structure;
