//! Terminal interface helpers for raq

mod ui;

pub use ui::{display_banner, print_help, print_response, read_input};
