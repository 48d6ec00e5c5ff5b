/// Script source of the bundled application entry, as served by the dev server.
pub const ENTRY_SCRIPT_SRC: &str = "/assets/main.js";

const RELOAD_SCRIPT: &str = include_str!("reload_client.js");
const BODY_CLOSE: &str = "</body>";

/// Injects the entry bundle tag (and, in development, the reload client)
/// right before the first `</body>`.
///
/// Insertion is purely textual. A template without `</body>` comes back
/// untouched.
pub fn inject_scripts(html: &str, dev: bool) -> String {
    inject_scripts_with_entry(html, ENTRY_SCRIPT_SRC, dev)
}

pub fn inject_scripts_with_entry(html: &str, entry_src: &str, dev: bool) -> String {
    let Some(pos) = html.find(BODY_CLOSE) else {
        return html.to_string();
    };

    let mut tags = format!("<script src=\"{}\" type=\"module\"></script>", entry_src);
    if dev {
        tags.push_str("<script type=\"module\">");
        tags.push_str(RELOAD_SCRIPT);
        tags.push_str("</script>");
    }

    let mut result = String::with_capacity(html.len() + tags.len());
    result.push_str(&html[..pos]);
    result.push_str(&tags);
    result.push_str(&html[pos..]);
    result
}
