//! Table rendering for precipitation-frequency results.
//!
//! Turns a [`pf_data::ResultBundle`] into duration × return-interval tables:
//! - [`table`]: selection, unit conversion and rounding
//! - [`html`]: HTML fragment output

pub mod html;
pub mod table;

pub use html::tables_to_html;
pub use table::{convert_value, format_value, render, render_all, Cell, PfTable, TableRow};
