//! Response-producing result types.
//!
//! A process that wants to answer the request stores an [`HttpResult`] on
//! the context; the service renders it after the pipeline finishes. The
//! core only needs the rendering seam - these implementations cover the
//! common cases (raw content, JSON, the fixed error body, not-found).

use serde_json::Value;

use crate::context::HttpContext;

/// A polymorphic response producer. Rendering writes status, headers and
/// body onto the context's response surface.
pub trait HttpResult: Send {
    fn render(&self, ctx: &mut HttpContext) -> anyhow::Result<()>;
}

/// Raw bytes with an explicit content type and status.
pub struct ContentResult {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ContentResult {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain".to_string(),
            body: body.into().into_bytes(),
        }
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/html".to_string(),
            body: body.into().into_bytes(),
        }
    }
}

impl HttpResult for ContentResult {
    fn render(&self, ctx: &mut HttpContext) -> anyhow::Result<()> {
        ctx.status(self.status);
        ctx.content_type(&self.content_type);
        ctx.write(&self.body);
        Ok(())
    }
}

/// A JSON body serialized from a [`serde_json::Value`].
pub struct JsonResult {
    pub status: u16,
    pub body: Value,
}

impl JsonResult {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

impl HttpResult for JsonResult {
    fn render(&self, ctx: &mut HttpContext) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(&self.body)?;
        ctx.status(self.status);
        ctx.content_type("application/json");
        ctx.write(&bytes);
        Ok(())
    }
}

/// A tagged server-side failure, rendered as a 500 with a terse body.
pub struct ErrorResult {
    pub tag: String,
    pub message: String,
}

impl ErrorResult {
    pub fn new(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

impl HttpResult for ErrorResult {
    fn render(&self, ctx: &mut HttpContext) -> anyhow::Result<()> {
        ctx.status(500);
        ctx.content_type("text/plain");
        ctx.write(format!("{}: {}", self.tag, self.message).as_bytes());
        Ok(())
    }
}

/// The terminal answer for paths no process claimed.
pub struct NotFoundResult;

impl HttpResult for NotFoundResult {
    fn render(&self, ctx: &mut HttpContext) -> anyhow::Result<()> {
        ctx.status(404);
        ctx.content_type("text/plain");
        ctx.write(b"not found");
        Ok(())
    }
}
