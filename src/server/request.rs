//! Parsing of raw `may_minihttp` requests into the context surface.

use std::collections::HashMap;
use std::io::Read;

use http::Method;
use may_minihttp::Request;
use tracing::debug;

use crate::context::HttpContext;

/// Parsed HTTP request data, the raw material for an [`HttpContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, ...).
    pub method: String,
    /// Request path with the query string stripped, not yet cleaned.
    pub path: String,
    /// HTTP headers with lowercased names.
    pub headers: HashMap<String, String>,
    /// Cookies from the `Cookie` header.
    pub cookies: HashMap<String, String>,
    /// Query string parameters.
    pub query_params: HashMap<String, String>,
    /// Query parameters merged with urlencoded body fields; body wins.
    pub form_params: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ParsedRequest {
    /// Build the per-request context. Path cleaning happens here, once.
    pub fn into_context(self) -> HttpContext {
        let method: Method = self.method.parse().unwrap_or(Method::GET);
        HttpContext::with_request(
            method,
            &self.path,
            self.headers,
            self.cookies,
            self.query_params,
            self.form_params,
            self.body,
        )
    }
}

/// Cookies from the lowercased header map.
pub fn parse_cookies(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .get("cookie")
        .map(|c| {
            c.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim().to_string();
                    let value = parts.next().unwrap_or("").trim().to_string();
                    Some((name, value))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Query string parameters from a raw path, URL-decoded.
pub fn parse_query_params(raw_path: &str) -> HashMap<String, String> {
    match raw_path.find('?') {
        Some(pos) => url::form_urlencoded::parse(raw_path[pos + 1..].as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Query params merged with urlencoded body fields. A field present in
/// both places takes the body value.
pub(crate) fn parse_form_params(
    query_params: &HashMap<String, String>,
    headers: &HashMap<String, String>,
    body: &[u8],
) -> HashMap<String, String> {
    let mut form = query_params.clone();
    let is_urlencoded = headers
        .get("content-type")
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if is_urlencoded && !body.is_empty() {
        for (k, v) in url::form_urlencoded::parse(body) {
            form.insert(k.to_string(), v.to_string());
        }
    }
    form
}

/// Extract everything the pipeline needs from a raw request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let mut body = Vec::new();
    req.body().read_to_end(&mut body).ok();

    let form_params = parse_form_params(&query_params, &headers, &body);

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_count = query_params.len(),
        body_bytes = body.len(),
        "request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        cookies,
        query_params,
        form_params,
        body,
    }
}
