//! Pattern compilation and matching - hot path for route lookup.

use anyhow::{bail, Context as _};
use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

use crate::route_data::RouteData;

/// Maximum number of extracted parameters before heap allocation.
/// Most routes have ≤4 params (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage used while extracting captures.
pub type ParamVec = SmallVec<[(String, String); MAX_INLINE_PARAMS]>;

/// One compiled route pattern: the original template, its regex, and the
/// declared parameter names in capture order. Immutable after compile.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a pattern template. Compilation is pure: compiling the same
    /// template twice yields an equivalent pattern.
    ///
    /// # Errors
    ///
    /// Fails on an empty or non-`/`-rooted template, an empty parameter
    /// name, a duplicate parameter name, or a catch-all that is not the
    /// final segment.
    pub fn compile(pattern: &str) -> anyhow::Result<Self> {
        if pattern.is_empty() || !pattern.starts_with('/') {
            bail!("route pattern must start with '/': {pattern:?}");
        }

        let mut regex_src = String::with_capacity(pattern.len() + 8);
        regex_src.push('^');
        let mut param_names: Vec<String> = Vec::new();

        let segments: Vec<&str> = pattern[1..].split('/').collect();
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    bail!("empty parameter name in pattern {pattern:?}");
                }
                if param_names.iter().any(|n| n == name) {
                    bail!("duplicate parameter {name:?} in pattern {pattern:?}");
                }
                regex_src.push_str("/([^/]+)");
                param_names.push(name.to_string());
            } else if let Some(name) = segment.strip_prefix('*') {
                if name.is_empty() {
                    bail!("empty catch-all name in pattern {pattern:?}");
                }
                if i != last {
                    bail!("catch-all must be the final segment in pattern {pattern:?}");
                }
                if param_names.iter().any(|n| n == name) {
                    bail!("duplicate parameter {name:?} in pattern {pattern:?}");
                }
                // the slash is optional: path cleaning drops trailing
                // slashes, so `/static/*path` must also match `/static`
                regex_src.push_str("(?:/(.*))?");
                param_names.push(name.to_string());
            } else if segment.is_empty() && i == last {
                // "/" or a trailing slash in the template; the root pattern
                // compiles to `^/$`, anything else keeps its cleaned form
                if segments.len() == 1 {
                    regex_src.push('/');
                }
            } else {
                regex_src.push('/');
                regex_src.push_str(&regex::escape(segment));
            }
        }
        regex_src.push('$');

        let regex = Regex::new(&regex_src)
            .with_context(|| format!("compiling route pattern {pattern:?}"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// The original template this pattern was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Declared parameter names in order of appearance.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Test `path` against this pattern, extracting parameters on a match.
    /// An unparticipating catch-all group yields an empty remainder.
    pub fn matches(&self, path: &str) -> Option<RouteData> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            let value = captures.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
            params.push((name.clone(), value.to_string()));
        }
        Some(RouteData::from_params(params))
    }
}

/// The compiled collection of route patterns, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    patterns: Vec<RoutePattern>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register a pattern template.
    ///
    /// # Errors
    ///
    /// Fails if the template is invalid or an identical template is
    /// already registered.
    pub fn register(&mut self, pattern: &str) -> anyhow::Result<()> {
        if self.patterns.iter().any(|p| p.pattern() == pattern) {
            bail!("route pattern already registered: {pattern:?}");
        }
        let compiled = RoutePattern::compile(pattern)?;
        debug!(pattern = %pattern, params = ?compiled.param_names(), "route registered");
        self.patterns.push(compiled);
        Ok(())
    }

    /// Match `path` against registered patterns, first-registered wins.
    pub fn matches(&self, path: &str) -> Option<RouteData> {
        self.find(path).map(|(_, data)| data)
    }

    /// Like [`RouteTable::matches`] but also reports which pattern won.
    pub fn find(&self, path: &str) -> Option<(&RoutePattern, RouteData)> {
        for pattern in &self.patterns {
            if let Some(data) = pattern.matches(path) {
                return Some((pattern, data));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePattern> {
        self.patterns.iter()
    }
}
