//! Output helpers: serialization, file names and HTML embedding.

use serde_json::Value;

use crate::types::Shape;

/// Serialize a document, pretty-printed with two-space indentation or compact.
pub fn render(document: &Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    }
}

/// Suggested download file name for a shape.
pub fn suggested_file_name(shape: &Shape) -> String {
    match shape {
        Shape::Medical { .. } => format!("{}-schema.json", shape.label()),
        Shape::LocalBusiness { .. } => "local-business-schema.json".to_string(),
        Shape::Service => "service-schema.json".to_string(),
    }
}

/// Wrap a document in a JSON-LD script element.
///
/// `</` is escaped so that string content cannot close the element.
pub fn script_tag(document: &Value, pretty: bool) -> Result<String, serde_json::Error> {
    let body = render(document, pretty)?.replace("</", "<\\/");
    Ok(format!(
        "<script type=\"application/ld+json\">\n{}\n</script>",
        body
    ))
}
