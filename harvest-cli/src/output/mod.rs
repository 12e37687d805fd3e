//! Output formatting for CLI.

mod json;
mod text;
mod writer;

pub use json::JsonFormatter;
pub use text::TextFormatter;
pub use writer::UrlWriter;
