//! HTTP service
//!
//! Blocking microserver, one thread per connection. The [`Analyzer`] is
//! built once at startup and shared read-only through an `Arc`.
//!
//! Routes:
//! - `GET /` service info
//! - `GET /health` liveness plus whether the classifier loaded
//! - `POST /analyze` run the full analysis on `{code, language}`

pub mod microserver;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::parsers::language_for_name;
use crate::pipeline::{AnalyzeError, Analyzer};
use microserver::{HttpRequest, HttpResponse};

/// State shared across request handlers
pub struct AppState {
    analyzer: Analyzer,
    version: String,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "python".to_string()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ml_model_loaded: bool,
}

#[derive(Serialize)]
struct RootResponse<'a> {
    message: &'static str,
    version: &'a str,
    endpoints: [&'static str; 2],
}

/// Error body in the `{"detail": ...}` shape
fn json_error(status: u16, detail: &str) -> HttpResponse {
    HttpResponse::json(status, &serde_json::json!({ "detail": detail }))
}

fn with_cors(response: HttpResponse) -> HttpResponse {
    response
        .with_header("Access-Control-Allow-Origin", "*")
        .with_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .with_header("Access-Control-Allow-Headers", "*")
}

/// Dispatch one request
pub fn route_request(request: &HttpRequest, state: &AppState) -> HttpResponse {
    let response = match (request.method.as_str(), request.path.as_str()) {
        ("OPTIONS", _) => HttpResponse::empty(204),
        ("GET", "/") => HttpResponse::json(
            200,
            &RootResponse {
                message: "Code Smell Detector API",
                version: &state.version,
                endpoints: ["/analyze", "/health"],
            },
        ),
        ("GET", "/health") => HttpResponse::json(
            200,
            &HealthResponse {
                status: "healthy",
                ml_model_loaded: state.analyzer.classifier().is_loaded(),
            },
        ),
        ("POST", "/analyze") => handle_analyze(request, state),
        (_, "/" | "/health" | "/analyze") => json_error(405, "Method Not Allowed"),
        _ => json_error(404, "Not Found"),
    };
    with_cors(response)
}

fn handle_analyze(request: &HttpRequest, state: &AppState) -> HttpResponse {
    let body: AnalyzeRequest = match serde_json::from_slice(&request.body) {
        Ok(body) => body,
        Err(e) => return json_error(422, &format!("Invalid request body: {}", e)),
    };
    if language_for_name(&body.language).is_none() {
        warn!("Unsupported language '{}', analyzing as Python", body.language);
    }

    let outcome = catch_unwind(AssertUnwindSafe(|| state.analyzer.analyze(&body.code)));
    match outcome {
        Ok(Ok(response)) => {
            info!(
                "Analyzed {} submission: {} findings, ml has_smell={}",
                body.language,
                response.smells.len(),
                response.ml_prediction.has_smell
            );
            HttpResponse::json(200, &response)
        }
        Ok(Err(e @ AnalyzeError::EmptyCode)) => json_error(400, &e.to_string()),
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "analysis failed".to_string());
            error!("Analysis panicked: {}", detail);
            json_error(500, &detail)
        }
    }
}

fn handle_connection(stream: &mut (impl Read + Write), state: &AppState) {
    let response = match microserver::read_request(stream) {
        Some(Ok(request)) => {
            let response = route_request(&request, state);
            info!("{} {} -> {}", request.method, request.path, response.status);
            response
        }
        Some(Err(e)) => {
            warn!("Rejected request: {}", e);
            with_cors(json_error(e.status(), &e.to_string()))
        }
        None => return,
    };
    microserver::write_response(stream, &response);
}

/// Bind and serve forever
pub fn run_server(host: &str, port: u16, state: Arc<AppState>) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener =
        TcpListener::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        "Listening on http://{} (ML model loaded: {})",
        addr,
        state.analyzer.classifier().is_loaded()
    );

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    handle_connection(&mut stream, &state);
                    let _ = stream.shutdown(Shutdown::Write);
                });
            }
            Err(e) => warn!("Accept error: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SmellClassifier;
    use crate::config::ProjectConfig;
    use std::io::Cursor;

    fn state() -> AppState {
        AppState::new(Analyzer::from_config(
            &ProjectConfig::default(),
            SmellClassifier::unloaded(),
        ))
    }

    fn request(method: &str, path: &str, body: &str) -> HttpRequest {
        HttpRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn body_json(response: &HttpResponse) -> serde_json::Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn test_root_and_health() {
        let state = state();
        let root = route_request(&request("GET", "/", ""), &state);
        assert_eq!(root.status, 200);
        let v = body_json(&root);
        assert_eq!(v["message"], "Code Smell Detector API");
        assert_eq!(v["endpoints"], serde_json::json!(["/analyze", "/health"]));

        let health = route_request(&request("GET", "/health", ""), &state);
        let v = body_json(&health);
        assert_eq!(v["status"], "healthy");
        assert_eq!(v["ml_model_loaded"], false);
    }

    #[test]
    fn test_analyze_returns_findings() {
        let body = serde_json::json!({ "code": "def f(a, b, c, d, e, f, g, h):\n    return 42\n" });
        let resp = route_request(&request("POST", "/analyze", &body.to_string()), &state());
        assert_eq!(resp.status, 200);
        let v = body_json(&resp);
        let smells = v["smells"].as_array().unwrap();
        assert_eq!(smells[0]["smell_type"], "Too Many Parameters");
        assert_eq!(smells[0]["severity"], "high");
        assert!(smells.iter().any(|s| s["smell_type"] == "Magic Number"));
        assert_eq!(v["metrics"]["functions"], 1);
        assert_eq!(v["ml_prediction"]["has_smell"], false);
        assert_eq!(v["ml_prediction"]["confidence"], 0.0);
    }

    #[test]
    fn test_analyze_error_statuses() {
        let state = state();
        let empty = route_request(&request("POST", "/analyze", r#"{"code": "  \n"}"#), &state);
        assert_eq!(empty.status, 400);
        assert_eq!(body_json(&empty)["detail"], "Code cannot be empty");

        let malformed = route_request(&request("POST", "/analyze", "{not json"), &state);
        assert_eq!(malformed.status, 422);

        let missing = route_request(&request("POST", "/analyze", r#"{"language": "python"}"#), &state);
        assert_eq!(missing.status, 422);
    }

    #[test]
    fn test_unknown_routes_and_methods() {
        let state = state();
        assert_eq!(route_request(&request("GET", "/nope", ""), &state).status, 404);
        assert_eq!(route_request(&request("GET", "/analyze", ""), &state).status, 405);

        let preflight = route_request(&request("OPTIONS", "/analyze", ""), &state);
        assert_eq!(preflight.status, 204);
        assert!(preflight
            .headers
            .iter()
            .any(|(k, v)| k == "Access-Control-Allow-Origin" && v == "*"));
    }

    #[test]
    fn test_handle_connection_writes_response() {
        let raw = b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec();
        let mut stream = Duplex {
            input: Cursor::new(raw),
            output: Vec::new(),
        };
        handle_connection(&mut stream, &state());
        let out = String::from_utf8(stream.output).unwrap();
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains("\"healthy\""));
    }

    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
