//! Static file serving
//!
//! The single-page console is embedded into the binary.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../assets/index.html");
const APP_JS: &str = include_str!("../assets/app.js");
const STYLE_CSS: &str = include_str!("../assets/style.css");

/// Static file handler
pub struct StaticFiles {}

impl StaticFiles {
    pub fn new() -> Self {
        Self {}
    }

    pub fn index(&self) -> Response {
        serve_embedded(INDEX_HTML, "text/html; charset=utf-8")
    }

    /// Serve an embedded asset by path relative to `/static/`
    pub fn serve(&self, path: &str) -> Response {
        let content_type = guess_content_type(path);

        match path {
            "app.js" => serve_embedded(APP_JS, content_type),
            "style.css" => serve_embedded(STYLE_CSS, content_type),
            "index.html" => serve_embedded(INDEX_HTML, content_type),
            _ => (StatusCode::NOT_FOUND, "File not found").into_response(),
        }
    }
}

impl Default for StaticFiles {
    fn default() -> Self {
        Self::new()
    }
}

fn guess_content_type(path: &str) -> &'static str {
    if path.ends_with(".js") {
        "application/javascript"
    } else if path.ends_with(".css") {
        "text/css"
    } else if path.ends_with(".html") {
        "text/html; charset=utf-8"
    } else if path.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

fn serve_embedded(content: &'static str, content_type: &'static str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        content,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(guess_content_type("app.js"), "application/javascript");
        assert_eq!(guess_content_type("style.css"), "text/css");
        assert_eq!(guess_content_type("blob"), "application/octet-stream");
    }

    #[test]
    fn test_unknown_asset_is_404() {
        assert_eq!(StaticFiles::new().serve("nope.js").status(), StatusCode::NOT_FOUND);
        assert_eq!(StaticFiles::new().serve("app.js").status(), StatusCode::OK);
    }

    #[test]
    fn test_run_results_are_bound_to_their_login() {
        let handler = &APP_JS[APP_JS.find("'/api/run'").expect("run call")..];
        let success = handler.find("output.innerHTML = res.html").expect("result render");
        let guard = handler.find("if (token !== runToken) return;").expect("token guard");
        assert!(guard < success);
        assert!(APP_JS.contains("const runToken = token;"));
        assert!(!handler[..handler.find("expand-collapse").unwrap_or(handler.len())].contains("finally"));
    }

    #[test]
    fn test_index_has_console_anchors() {
        for id in ["codeInput", "runButton", "outputArea", "captchaInput", "cookieConsent", "logoutButton"] {
            assert!(INDEX_HTML.contains(&format!("id=\"{id}\"")), "missing #{id}");
        }
    }
}
