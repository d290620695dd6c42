//! Local preview server for the build output.
//!
//! Serves `_site/` over HTTP with `tiny_http`. There is no file watching:
//! `folio serve` builds once, then serves what it wrote until killed.
//!
//! Request resolution:
//! 1. Exact file match
//! 2. Directory with `index.html`
//! 3. Otherwise 404
//!
//! Query strings are ignored and paths are URL-decoded. Any `..` segment is
//! answered with 404 so nothing outside the output root is reachable.

use crate::config::ServeConfig;
use std::fs;
use std::io::Cursor;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Ports tried after the configured one is taken.
const MAX_PORT_RETRIES: u16 = 10;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("invalid serve.interface `{0}`")]
    Interface(String),
    #[error("failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bind to `serve.interface:serve.port`, moving up to the next free port.
pub fn bind(config: &ServeConfig) -> Result<(Server, SocketAddr), ServeError> {
    let interface: IpAddr = config
        .interface
        .parse()
        .map_err(|_| ServeError::Interface(config.interface.clone()))?;
    try_bind_port(interface, config.port, MAX_PORT_RETRIES)
}

fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    tracing::warn!(base_port, port, "port in use, using next free port");
                }
                // Port 0 asks the OS for one; report the real address.
                let bound = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, bound));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(ServeError::Bind {
        attempts: max_retries,
        first: base_port,
        last: base_port.saturating_add(max_retries.saturating_sub(1)),
        message: last_error,
    })
}

/// Answer requests from `root` until the server is dropped or unblocked.
pub fn run(server: &Server, root: &Path) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            tracing::warn!(error = %e, "request failed");
        }
    }
}

/// What a request URL maps to under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    File(PathBuf),
    NotFound,
}

/// Map a request URL (`/posts/hello/?x=1`) to a file under `root`.
pub fn resolve(root: &Path, url: &str) -> Resolution {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let Ok(decoded) = urlencoding::decode(path) else {
        return Resolution::NotFound;
    };
    let request_path = decoded.trim_matches('/');
    if request_path
        .split(['/', '\\'])
        .any(|segment| segment == "..")
    {
        return Resolution::NotFound;
    }

    let local = root.join(request_path);
    if local.is_file() {
        return Resolution::File(local);
    }
    let index = local.join("index.html");
    if local.is_dir() && index.is_file() {
        return Resolution::File(index);
    }
    Resolution::NotFound
}

fn handle_request(request: Request, root: &Path) -> Result<(), ServeError> {
    let resolution = resolve(root, request.url());
    tracing::debug!(url = request.url(), ?resolution, "request");
    match resolution {
        Resolution::File(path) => serve_file(request, &path),
        Resolution::NotFound => serve_not_found(request),
    }
}

fn content_type_header(value: &str) -> Option<Header> {
    Header::from_bytes("Content-Type", value).ok()
}

fn serve_file(request: Request, path: &Path) -> Result<(), ServeError> {
    let content = fs::read(path)?;
    let mut response = Response::from_data(content);
    if let Some(header) = content_type_header(guess_content_type(path)) {
        response = response.with_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn serve_not_found(request: Request) -> Result<(), ServeError> {
    let body = "404 Not Found";
    let response = Response::new(
        StatusCode(404),
        content_type_header("text/plain; charset=utf-8")
            .into_iter()
            .collect(),
        Cursor::new(body),
        Some(body.len()),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// MIME type from file extension; `application/octet-stream` when unknown.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/rss+xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        _ => "application/octet-stream",
    }
}
