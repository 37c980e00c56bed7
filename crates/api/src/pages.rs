//! Server-rendered HTML fragments for the browser flow.

use docsort_models::{Document, DocumentError, DocumentSummary};
use std::fmt::Write;

pub const NO_FILE_UPLOADED: &str = "No file uploaded";
pub const DOCUMENT_NOT_FOUND: &str = "❌ Document not found";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn upload_result(doc: &Document) -> String {
    format!(
        "<h2>Extracted Text:</h2>\n<pre>{}</pre>\n<h2>Predicted Category:</h2>\n<p>{}</p>\n<a href='/dashboard'>📂 Go to Dashboard</a>\n",
        escape_html(&doc.extracted_text),
        escape_html(doc.category.as_str()),
    )
}

pub fn processing_error(error: &DocumentError) -> String {
    format!("❌ Error processing file: {}", escape_html(&error.to_string()))
}

pub fn dashboard(docs: &[DocumentSummary]) -> String {
    let mut html = String::from("<h1>📂 Document Dashboard</h1><ul>");
    for doc in docs {
        // Writing to a String cannot fail.
        let _ = write!(
            html,
            "<li>{} — <b>{}</b> [<a href='/view/{}'>View</a>]</li>",
            escape_html(&doc.filename),
            escape_html(doc.category.as_str()),
            doc.id
        );
    }
    html.push_str("</ul><a href='/'>⬅️ Upload More</a>");
    html
}

pub fn document_view(doc: &Document) -> String {
    format!(
        "<h2>File: {}</h2>\n<h3>Category: {}</h3>\n<pre>{}</pre>\n<a href='/dashboard'>⬅️ Back to Dashboard</a>\n",
        escape_html(&doc.filename),
        escape_html(doc.category.as_str()),
        escape_html(&doc.extracted_text),
    )
}
