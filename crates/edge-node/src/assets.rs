//! Disk-backed asset loading with extension-based content types.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

/// Map a file extension to a content type. Unknown extensions are served
/// as opaque bytes.
pub fn mime_for_path(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") => "text/plain; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Turn a request path into a relative path safe to join under the assets
/// directory. Rejects any path with a parent-directory component so a
/// crafted path cannot escape the assets root.
pub fn sanitized(path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));

    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if clean.as_os_str().is_empty() {
        return None;
    }
    Some(clean)
}

/// Read one asset from disk. Returns the bytes and the inferred content
/// type, or `None` when the path is unsafe or the file is missing.
pub async fn load(assets_dir: &str, path: &str) -> Option<(Bytes, &'static str)> {
    let relative = sanitized(path)?;
    let full = Path::new(assets_dir).join(relative);

    match tokio::fs::read(&full).await {
        Ok(data) => Some((Bytes::from(data), mime_for_path(path))),
        Err(e) => {
            tracing::debug!(path = %full.display(), error = %e, "asset read failed");
            None
        }
    }
}
