use std::sync::OnceLock;

use regex::Regex;

/// Image host whose URLs carry a rewritable size directive. Discovery and
/// normalization both key off this marker.
pub const IMAGE_HOST_MARKER: &str = "googleusercontent.com";

fn size_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)=[sw]\d+(?:-[a-z0-9]+)*([?#]|$)").expect("valid size directive pattern")
    })
}

fn width_height_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)=w\d+-h\d+(?:-[a-z0-9]+)*([?#]|$)")
            .expect("valid width-height directive pattern")
    })
}

/// Rewrites an image-host size directive (`=s1024`, `=w800-rw`, ...) to `=s0`,
/// the host convention for "original size".
///
/// Best effort: URLs without the host marker, or without a recognizable
/// directive, come back byte-identical. Idempotent: a second pass rewrites
/// `=s0` to itself.
pub fn normalize_to_s0(url: &str) -> String {
    if !url.contains(IMAGE_HOST_MARKER) {
        return url.to_string();
    }
    let updated = size_directive().replace(url, "=s0$1");
    if updated != url {
        return updated.into_owned();
    }
    width_height_directive().replace(url, "=s0$1").into_owned()
}
