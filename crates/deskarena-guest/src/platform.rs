//! Platform-specific probes the guest server exposes over HTTP. The guest
//! this binary runs inside is always Windows (§1), so every probe here has
//! a real Windows implementation behind `cfg(windows)`; the `cfg(not(windows))`
//! arm exists only so the crate builds and can be exercised in CI/dev on a
//! non-Windows host, and returns the same permissive "nothing found" value
//! the evaluator layer already treats as a 0 contribution (§7, point 4/5).

use std::path::Path;
use std::process::Output;

pub fn default_shell() -> (&'static str, &'static str) {
    if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}

pub async fn run_shell(command: &str, shell: Option<&str>) -> std::io::Result<Output> {
    let (program, flag) = match shell {
        Some(custom) if cfg!(windows) => (custom, "/C"),
        Some(custom) => (custom, "-c"),
        None => default_shell(),
    };
    tokio::process::Command::new(program).arg(flag).arg(command).output().await
}

#[cfg(windows)]
pub fn registry_query(key: &str, name: &str) -> Option<String> {
    let output = std::process::Command::new("reg").arg("query").arg(key).arg("/v").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    text.lines().find_map(|line| {
        let trimmed = line.trim();
        trimmed.strip_prefix(name).map(|rest| rest.trim().rsplit_once("    ").map(|(_, v)| v).unwrap_or(rest.trim()).to_string())
    })
}

#[cfg(not(windows))]
pub fn registry_query(_key: &str, _name: &str) -> Option<String> {
    None
}

pub fn desktop_path() -> std::path::PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| std::path::PathBuf::from("."))
}

pub fn documents_path() -> std::path::PathBuf {
    dirs::document_dir().unwrap_or_else(|| std::path::PathBuf::from("."))
}

#[cfg(windows)]
pub fn wallpaper_path() -> Option<String> {
    registry_query(r"HKCU\Control Panel\Desktop", "Wallpaper")
}

#[cfg(not(windows))]
pub fn wallpaper_path() -> Option<String> {
    None
}

/// Returns `(width, height)` of the primary display, falling back to the
/// task's configured default screen size when no display is attached
/// (headless CI, dev container).
pub fn screen_size(fallback: (u32, u32)) -> (u32, u32) {
    match screenshots::Screen::all() {
        Ok(screens) => screens
            .first()
            .map(|s| (s.display_info.width, s.display_info.height))
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}

pub fn is_directory_read_only_for_user(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.permissions().readonly(),
        Err(_) => false,
    }
}
