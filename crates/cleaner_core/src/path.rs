/// Default folder under the platform download root for original images.
pub const DEFAULT_INPUT_SUBDIR: &str = "Gemini-Originals";

/// Normalizes a user-supplied download subdirectory.
///
/// Trims whitespace, strips leading and trailing path separators (both `/`
/// and `\`), and falls back to `fallback` when nothing remains.
pub fn resolve_download_subdir(value: Option<&str>, fallback: &str) -> String {
    let Some(value) = value else {
        return fallback.to_string();
    };
    let stripped = value.trim().trim_matches(['/', '\\']);
    if stripped.is_empty() {
        fallback.to_string()
    } else {
        stripped.to_string()
    }
}

/// True when `segment` appears as a whole path component of `path`, under
/// either separator convention. The platform download subsystem reports
/// native paths, so neither separator can be assumed.
pub fn path_contains_segment(path: &str, segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    path.split(['/', '\\']).any(|part| part == segment)
}
