use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `SCHOOLPLANNER_QUIET=1` silences decorative CLI output (headers, hints).
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("SCHOOLPLANNER_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
