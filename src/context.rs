//! Per-request mutable state threaded through the dispatch pipeline.
//!
//! An [`HttpContext`] is created when a request arrives, passed by
//! exclusive reference through every pipeline stage, and discarded once
//! the response is written. It is never shared across requests.
//!
//! The request path is whitespace-trimmed and cleaned exactly once, at
//! construction; no later stage re-cleans it.

use std::collections::HashMap;
use std::fmt;

use http::Method;
use serde_json::Value;

use crate::result::HttpResult;
use crate::route_data::RouteData;

/// Clean a raw request path: trim whitespace, collapse repeated slashes,
/// resolve `.` and `..` segments, force a leading slash, and drop any
/// trailing slash (the root stays `/`).
pub fn clean_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut segments: Vec<&str> = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let mut path = String::with_capacity(trimmed.len() + 1);
    path.push('/');
    path.push_str(&segments.join("/"));
    path
}

/// Per-request state: the parsed request surface, the data processes
/// share (`route_data`, `view_data`, `flash`), the outcome (`result`,
/// `error`), and the accumulating response.
pub struct HttpContext {
    /// HTTP method of the request.
    pub method: Method,
    /// Cleaned request path, set once at construction.
    pub request_path: String,
    /// Physical file path resolved by a file-serving process, if any.
    pub physical_path: String,
    /// Parameters extracted by the matching route pattern.
    pub route_data: RouteData,
    /// Free-form data handed from processes to result rendering.
    pub view_data: HashMap<String, Value>,
    /// The response producer, rendered after the pipeline finishes.
    pub result: Option<Box<dyn HttpResult>>,
    /// Last failure recorded by a pipeline stage.
    pub error: Option<anyhow::Error>,

    flash: Option<HashMap<String, Value>>,

    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
    body: Vec<u8>,

    status: Option<u16>,
    response_headers: Vec<(String, String)>,
    response_body: Vec<u8>,
}

impl HttpContext {
    /// Bare context for the given method and raw path. The request
    /// surface (headers, form data, body) starts empty.
    pub fn new(method: Method, raw_path: &str) -> Self {
        Self::with_request(
            method,
            raw_path,
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            Vec::new(),
        )
    }

    /// Context carrying a fully parsed request surface. `headers` keys are
    /// expected lowercased; `form` holds query params merged with any
    /// urlencoded body fields.
    pub fn with_request(
        method: Method,
        raw_path: &str,
        headers: HashMap<String, String>,
        cookies: HashMap<String, String>,
        query: HashMap<String, String>,
        form: HashMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            request_path: clean_path(raw_path),
            physical_path: String::new(),
            route_data: RouteData::new(),
            view_data: HashMap::new(),
            result: None,
            error: None,
            flash: None,
            headers,
            cookies,
            query,
            form,
            body,
            status: None,
            response_headers: Vec::new(),
            response_body: Vec::new(),
        }
    }

    // --- route data -----------------------------------------------------

    /// Raw route parameter value by name.
    pub fn route_value(&self, name: &str) -> Option<&str> {
        self.route_data.get(name)
    }

    // --- form values ----------------------------------------------------

    /// Form value by name (query params plus urlencoded body fields).
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// Integer form value; `None` if absent or not an integer.
    pub fn form_int(&self, name: &str) -> Option<i64> {
        self.form_value(name)?.parse().ok()
    }

    pub fn form_int_or(&self, name: &str, default: i64) -> i64 {
        self.form_int(name).unwrap_or(default)
    }

    /// Boolean form value; `None` if absent or not `true`/`false`.
    pub fn form_bool(&self, name: &str) -> Option<bool> {
        self.form_value(name)?.parse().ok()
    }

    pub fn form_bool_or(&self, name: &str, default: bool) -> bool {
        self.form_bool(name).unwrap_or(default)
    }

    /// Float form value; `None` if absent or not a number.
    pub fn form_float(&self, name: &str) -> Option<f64> {
        self.form_value(name)?.parse().ok()
    }

    pub fn form_float_or(&self, name: &str, default: f64) -> f64 {
        self.form_float(name).unwrap_or(default)
    }

    /// Query string value by name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    // --- request headers and body ---------------------------------------

    /// Request header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Request `User-Agent` header.
    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    /// Request `Accept` header.
    pub fn accept(&self) -> Option<&str> {
        self.header("accept")
    }

    /// Request cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Raw request body bytes.
    pub fn read_body(&self) -> &[u8] {
        &self.body
    }

    // --- response surface -----------------------------------------------

    /// Set a response header, replacing any existing value for that name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response_headers
            .retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.response_headers
            .push((name.to_string(), value.to_string()));
    }

    /// Add a response header without replacing existing values.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.response_headers
            .push((name.to_string(), value.to_string()));
    }

    /// Set the response `Content-Type` header.
    pub fn content_type(&mut self, content_type: &str) {
        self.set_header("Content-Type", content_type);
    }

    /// Set the response `Expires` header.
    pub fn expires(&mut self, value: &str) {
        self.set_header("Expires", value);
    }

    /// Add a `Set-Cookie` response header.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.add_header("Set-Cookie", &format!("{name}={value}"));
    }

    /// Set the response status code.
    pub fn status(&mut self, code: u16) {
        self.status = Some(code);
    }

    /// Append bytes to the response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.response_body.extend_from_slice(bytes);
    }

    /// Response status set so far, if any.
    pub fn response_status(&self) -> Option<u16> {
        self.status
    }

    /// First response header value for `name` (case-insensitive).
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All response headers in insertion order.
    pub fn response_headers(&self) -> &[(String, String)] {
        &self.response_headers
    }

    /// Response body accumulated so far.
    pub fn response_body(&self) -> &[u8] {
        &self.response_body
    }

    // --- flash ----------------------------------------------------------

    /// Store a request-scoped flash value. The flash map is allocated on
    /// first write.
    pub fn set_flash(&mut self, key: &str, value: Value) {
        self.flash
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value);
    }

    /// Read a flash value. Never allocates the flash map.
    pub fn flash(&self, key: &str) -> Option<&Value> {
        self.flash.as_ref()?.get(key)
    }

    /// Whether any flash value has been written.
    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    // --- error ----------------------------------------------------------

    pub fn set_error(&mut self, err: anyhow::Error) {
        self.error = Some(err);
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl fmt::Display for HttpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} status={:?} error={:?}",
            self.method, self.request_path, self.status, self.error
        )
    }
}
