//! Ranked item exports: CSV and a standalone HTML table.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use okza_core::Item;
use tracing::info;

/// Column headers shared by both exports.
pub const COLUMNS: [&str; 5] = ["Title", "URL", "Price", "Currency", "Seller"];

/// Writes the items as CSV, in rank order.
pub fn write_csv(path: &Path, items: &[Item]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(COLUMNS)?;
    for item in items {
        writer.write_record([
            item.title.as_str(),
            item.url.as_str(),
            &price_cell(item),
            item.currency.as_str(),
            item.seller.as_str(),
        ])?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = items.len(), "Wrote CSV export");
    Ok(())
}

/// Renders the items as an HTML document holding one table.
pub fn render_html(title: &str, items: &[Item]) -> String {
    let mut html = String::new();
    let title = escape_html(title);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    html.push_str("<table border=\"1\">\n<thead>\n<tr>");
    for column in COLUMNS {
        let _ = write!(html, "<th>{column}</th>");
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for item in items {
        let url = escape_html(&item.url);
        let link = if url.is_empty() {
            String::new()
        } else {
            format!("<a href=\"{url}\">{url}</a>")
        };
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{link}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&item.title),
            price_cell(item),
            escape_html(&item.currency),
            escape_html(&item.seller),
        );
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Writes the HTML table export.
pub fn write_html(path: &Path, title: &str, items: &[Item]) -> Result<()> {
    std::fs::write(path, render_html(title, items))
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = items.len(), "Wrote HTML export");
    Ok(())
}

/// Price as exported; blank when the provider gave no usable price.
fn price_cell(item: &Item) -> String {
    if item.price_known {
        item.price.to_string()
    } else {
        String::new()
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
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
