//! Deployment base path handling.
///
/// When `PUBLIC_URL` is set at compile time (e.g. `/booking` when the UI is
/// served from a subdirectory), generated URLs are prefixed accordingly. Local
/// builds without `PUBLIC_URL` fall back to root-anchored paths.
#[must_use]
pub fn asset_path(relative: &str) -> String {
    asset_path_with_base(relative, option_env!("PUBLIC_URL").unwrap_or(""))
}

/// Base path for the router; `None` serves the app from the root.
#[must_use]
pub fn router_base() -> Option<String> {
    router_base_with_base(option_env!("PUBLIC_URL").unwrap_or(""))
}

/// Shown in place of a bus photo that could not be loaded.
#[must_use]
pub fn image_placeholder() -> String {
    asset_path("static/img/bus-placeholder.svg")
}

fn asset_path_with_base(relative: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    let rel = relative.trim_start_matches('/');

    if base.is_empty() {
        format!("/{rel}")
    } else {
        format!("{base}/{rel}")
    }
}

fn router_base_with_base(base: &str) -> Option<String> {
    let base = base.trim_end_matches('/').trim();
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}
