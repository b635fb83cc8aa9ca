//! Writing accumulated context responses onto `may_minihttp` responses.

use may_minihttp::Response;

use crate::context::HttpContext;

/// Name of the server-identification header set on every response.
pub const SERVER_HEADER_NAME: &str = "Server";
/// Value of the server-identification header.
pub const SERVER_NAME: &str = "relaykit";

const SERVER_HEADER_LINE: &str = "Server: relaykit";

/// Status and message of the fixed internal-error response produced by
/// the outer isolation boundary.
pub const INTERNAL_ERROR_STATUS: u16 = 500;
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Static line for headers the service emits on virtually every response,
/// so the leak below stays confined to genuinely dynamic headers.
fn static_header_line(name: &str, value: &str) -> Option<&'static str> {
    const COMMON: &[(&str, &str, &str)] = &[
        (SERVER_HEADER_NAME, SERVER_NAME, SERVER_HEADER_LINE),
        ("Content-Type", "text/plain", "Content-Type: text/plain"),
        ("Content-Type", "text/html", "Content-Type: text/html"),
        (
            "Content-Type",
            "application/json",
            "Content-Type: application/json",
        ),
    ];
    COMMON
        .iter()
        .find(|(n, v, _)| name.eq_ignore_ascii_case(n) && *v == value)
        .map(|(_, _, line)| *line)
}

/// Write the response accumulated on the context. Status defaults to 200
/// when a body was written without one being set explicitly.
pub fn write_context_response(res: &mut Response, ctx: &HttpContext) {
    let status = ctx.response_status().unwrap_or(200);
    res.status_code(status as usize, status_reason(status));
    for (name, value) in ctx.response_headers() {
        match static_header_line(name, value) {
            Some(line) => {
                res.header(line);
            }
            None => {
                // may_minihttp wants 'static header lines
                let line = format!("{name}: {value}").into_boxed_str();
                res.header(Box::leak(line));
            }
        }
    }
    res.body_vec(ctx.response_body().to_vec());
}

/// The fixed-status, fixed-message response for failures that escape the
/// pipeline. Bypasses normal result rendering but still identifies the
/// server, like every other response.
pub fn write_internal_error(res: &mut Response) {
    res.status_code(
        INTERNAL_ERROR_STATUS as usize,
        status_reason(INTERNAL_ERROR_STATUS),
    );
    res.header(SERVER_HEADER_LINE);
    res.header("Content-Type: text/plain");
    res.body_vec(INTERNAL_ERROR_MESSAGE.as_bytes().to_vec());
}
