//! Static fallback for requests that match no route.
//!
//! # Responsibilities
//! - Serve files from the client bundle with their content type
//! - Serve the fallback document for client-side navigations
//! - Never read outside the configured root
//!
//! # Design Decisions
//! - Only GET and HEAD are served; other methods get 404
//! - Unsafe paths are treated as navigations, not errors
//! - A missing fallback document is a 404, not a crash

pub mod mime;

use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Response, StatusCode};

use crate::error::GatewayError;

const DIRECTORY_INDEX: &str = "index.html";

/// The pre-built client bundle.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    fallback: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>, fallback_document: impl AsRef<Path>) -> Self {
        let root = root.into();
        let fallback = root.join(fallback_document);
        Self { root, fallback }
    }

    /// Serve `path` from the bundle, or the fallback document.
    pub async fn serve(&self, method: &Method, path: &str) -> Result<Response<Body>, GatewayError> {
        if method != Method::GET && method != Method::HEAD {
            return Err(GatewayError::NotFound);
        }

        let file = match self.resolve(path).await {
            Some(file) => file,
            None => {
                tracing::debug!(path = %path, "Serving fallback document");
                self.fallback.clone()
            }
        };

        let contents = match tokio::fs::read(&file).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(file = %file.display(), "Static file missing");
                return Err(GatewayError::NotFound);
            }
            Err(e) => return Err(GatewayError::StaticAsset(e)),
        };

        let length = contents.len();
        let body = if method == Method::HEAD {
            Body::empty()
        } else {
            Body::from(contents)
        };

        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(mime::content_type_for(&file)),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        Ok(response)
    }

    /// Map a request path to an existing file inside the root.
    async fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = sanitize(path)?;
        let candidate = self.root.join(relative);

        let metadata = tokio::fs::metadata(&candidate).await.ok()?;
        if metadata.is_file() {
            return Some(candidate);
        }
        if metadata.is_dir() {
            let index = candidate.join(DIRECTORY_INDEX);
            if tokio::fs::metadata(&index).await.ok()?.is_file() {
                return Some(index);
            }
        }
        None
    }
}

/// Relative path for a request path, rejecting anything that could escape the root.
///
/// Segments are percent-decoded first, so encoded separators or `..` are
/// rejected as well.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split('/') {
        let segment = urlencoding::decode(segment).ok()?;
        match segment.as_ref() {
            "" | "." => {}
            ".." => return None,
            part if part.contains(|c: char| matches!(c, '/' | '\\' | '\0')) => return None,
            part => {
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(normal)), None) => relative.push(normal),
                    _ => return None,
                }
            }
        }
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> (tempfile::TempDir, StaticAssets) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::create_dir_all(dir.path().join("static/js")).unwrap();
        std::fs::write(dir.path().join("static/js/main.js"), "console.log(1)").unwrap();
        let assets = StaticAssets::new(dir.path(), "index.html");
        (dir, assets)
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("/static/js/main.js"), Some(PathBuf::from("static/js/main.js")));
        assert_eq!(sanitize("/"), Some(PathBuf::new()));
        assert_eq!(sanitize("/./a"), Some(PathBuf::from("a")));
        assert_eq!(sanitize("/../etc/passwd"), None);
        assert_eq!(sanitize("/static/../../secret"), None);
    }

    #[test]
    fn test_sanitize_decodes_segments() {
        assert_eq!(sanitize("/my%20file.js"), Some(PathBuf::from("my file.js")));
        assert_eq!(sanitize("/%2e%2e/etc/passwd"), None);
        assert_eq!(sanitize("/static%2F..%2Fsecret"), None);
        assert_eq!(sanitize("/bad%ff"), None);
    }

    #[tokio::test]
    async fn test_serves_percent_encoded_asset() {
        let (dir, assets) = bundle();
        std::fs::write(dir.path().join("my file.js"), "spaced()").unwrap();

        let response = assets.serve(&Method::GET, "/my%20file.js").await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "spaced()");
    }

    #[tokio::test]
    async fn test_serves_asset_with_content_type() {
        let (_dir, assets) = bundle();
        let response = assets.serve(&Method::GET, "/static/js/main.js").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_navigation_gets_fallback() {
        let (_dir, assets) = bundle();
        for path in ["/", "/dashboard/settings", "/../../etc/passwd"] {
            let response = assets.serve(&Method::GET, path).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
            assert_eq!(body_text(response).await, "<html>app</html>");
        }
    }

    #[tokio::test]
    async fn test_head_has_length_but_no_body() {
        let (_dir, assets) = bundle();
        let response = assets.serve(&Method::HEAD, "/index.html").await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "16");
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_other_methods_are_not_found() {
        let (_dir, assets) = bundle();
        let err = assets.serve(&Method::POST, "/dashboard").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));
    }

    #[tokio::test]
    async fn test_missing_fallback_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let assets = StaticAssets::new(dir.path(), "index.html");
        let err = assets.serve(&Method::GET, "/anything").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));
    }
}
