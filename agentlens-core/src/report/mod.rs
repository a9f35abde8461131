//! Report generation: console text and dashboard JSON.

pub mod json;
pub mod terminal;

pub use json::{DashboardSummary, write_summary};
pub use terminal::render_terminal;
