/// Escape the five HTML-reserved characters so the result can sit inside
/// element text or a quoted attribute value.
///
/// `None` is treated as an empty string. `&` is replaced first so entities
/// produced by the later replacements are not escaped twice.
pub fn escape_html<'a>(unsafe_text: impl Into<Option<&'a str>>) -> String {
    unsafe_text
        .into()
        .unwrap_or_default()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
