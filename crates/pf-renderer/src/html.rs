//! HTML fragment output.
//!
//! Produces bare `<table>` markup; page chrome and styling belong to the
//! page that embeds it.

use std::fmt::Write;

use crate::table::PfTable;

impl PfTable {
    /// Render as a `<table>` element.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096 + self.rows.len() * 1024);

        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            r#"<table class="table is-bordered" id="{}-pf-table">"#,
            escape_html(self.gcm.as_str())
        );
        let _ = writeln!(out, "  <caption>{}</caption>", escape_html(&self.caption()));
        out.push_str("  <thead>\n");
        let _ = writeln!(
            out,
            r#"    <tr class="noborder"><th scope="col">Duration</th><th scope="col" colspan="{}">Average recurrence interval (years)</th></tr>"#,
            self.intervals.len()
        );
        out.push_str("    <tr><th></th>");
        for interval in &self.intervals {
            let _ = write!(out, r#"<th scope="col">{}</th>"#, interval_label(*interval));
        }
        out.push_str("</tr>\n  </thead>\n  <tbody>\n");

        for row in &self.rows {
            let _ = write!(
                out,
                r#"    <tr><th scope="row">{}</th>"#,
                escape_html(&row.duration)
            );
            for cell in &row.cells {
                let _ = write!(
                    out,
                    "<td><p><strong>{}</strong></p><span><em>({}&ndash;{})</em></span></td>",
                    cell.value_text(),
                    cell.lower_text(),
                    cell.upper_text()
                );
            }
            out.push_str("</tr>\n");
        }

        out.push_str("  </tbody>\n</table>\n");
        out
    }
}

/// Concatenate several tables into one fragment.
pub fn tables_to_html(tables: &[PfTable]) -> String {
    tables.iter().map(PfTable::to_html).collect()
}

/// Whole years print without a fraction (`2`, `1000`).
fn interval_label(interval: f64) -> String {
    if interval.fract() == 0.0 {
        format!("{:.0}", interval)
    } else {
        interval.to_string()
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
