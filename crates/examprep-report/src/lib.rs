//! examprep-report — Results page rendering.
//!
//! Turns a scored [`TestReport`](examprep_core::report::TestReport) into a
//! self-contained HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
