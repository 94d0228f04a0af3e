//! Content type detection for bundle assets.

use std::path::Path;

/// Content type for a file, derived from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        // Documents and styles
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",

        // Scripts
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_types() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(
            content_type_for(Path::new("static/js/main.8c1f.js")),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(content_type_for(Path::new("static/css/main.css")), "text/css; charset=utf-8");
        assert_eq!(content_type_for(Path::new("logo192.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("manifest.json")), "application/json");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for(Path::new("LICENSE")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("archive.xyz")), "application/octet-stream");
    }
}
