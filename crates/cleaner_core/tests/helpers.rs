use cleaner_core::{
    normalize_to_s0, path_contains_segment, resolve_download_subdir, stage_for_upload_total,
    Stage, DEFAULT_INPUT_SUBDIR,
};

#[test]
fn normalize_rewrites_size_directives() {
    let cases = [
        (
            "https://lh3.googleusercontent.com/img/abc=s512",
            "https://lh3.googleusercontent.com/img/abc=s0",
        ),
        (
            "https://lh3.googleusercontent.com/img/abc=w800",
            "https://lh3.googleusercontent.com/img/abc=s0",
        ),
        (
            "https://lh3.googleusercontent.com/img/abc=s512-rw-no?x=1",
            "https://lh3.googleusercontent.com/img/abc=s0?x=1",
        ),
        (
            "https://lh3.googleusercontent.com/img/abc=w1024-h768#frag",
            "https://lh3.googleusercontent.com/img/abc=s0#frag",
        ),
        (
            "https://lh3.googleusercontent.com/img/abc=S512",
            "https://lh3.googleusercontent.com/img/abc=s0",
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(normalize_to_s0(input), expected, "input: {input}");
    }
}

#[test]
fn normalize_leaves_unrecognized_urls_untouched() {
    let untouched = [
        // Wrong host: never rewritten even with a directive present.
        "https://example.com/img/abc=s512",
        // Right host, no directive.
        "https://lh3.googleusercontent.com/img/abc",
        // Directive not at a boundary.
        "https://lh3.googleusercontent.com/img/abc=s512/more",
    ];
    for input in untouched {
        assert_eq!(normalize_to_s0(input), input);
    }
}

#[test]
fn normalize_is_idempotent() {
    let inputs = [
        "https://lh3.googleusercontent.com/img/abc=s512",
        "https://lh3.googleusercontent.com/img/abc=w1024-h768-rw",
        "https://lh3.googleusercontent.com/img/abc=s0",
        "https://example.com/plain.png",
    ];
    for input in inputs {
        let once = normalize_to_s0(input);
        assert_eq!(normalize_to_s0(&once), once, "input: {input}");
    }
}

#[test]
fn resolve_download_subdir_strips_separators_and_falls_back() {
    assert_eq!(resolve_download_subdir(Some("Originals"), "X"), "Originals");
    assert_eq!(
        resolve_download_subdir(Some("  Originals  "), "X"),
        "Originals"
    );
    assert_eq!(
        resolve_download_subdir(Some("/Originals/"), "X"),
        "Originals"
    );
    assert_eq!(
        resolve_download_subdir(Some("\\Originals\\"), "X"),
        "Originals"
    );
    assert_eq!(resolve_download_subdir(Some(""), "X"), "X");
    assert_eq!(resolve_download_subdir(Some("  /  "), "X"), "X");
    assert_eq!(
        resolve_download_subdir(None, DEFAULT_INPUT_SUBDIR),
        DEFAULT_INPUT_SUBDIR
    );
}

#[test]
fn path_segment_matching_handles_both_separators() {
    assert!(path_contains_segment(
        "/home/me/Downloads/Gemini-Originals/a.png",
        "Gemini-Originals"
    ));
    assert!(path_contains_segment(
        "C:\\Downloads\\Gemini-Originals\\a.png",
        "Gemini-Originals"
    ));
    assert!(!path_contains_segment(
        "/home/me/Downloads/Gemini-Originals-old/a.png",
        "Gemini-Originals"
    ));
    assert!(!path_contains_segment("/home/me/a.png", "Gemini-Originals"));
    assert!(!path_contains_segment("/home/me/a.png", ""));
}

#[test]
fn stage_depends_only_on_upload_total() {
    assert_eq!(stage_for_upload_total(0), Stage::Clean);
    assert_eq!(stage_for_upload_total(1), Stage::Upload);
    assert_eq!(stage_for_upload_total(250), Stage::Upload);
}
