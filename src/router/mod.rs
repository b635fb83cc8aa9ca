//! # Router Module
//!
//! Path-pattern compilation and matching for the dispatch core.
//!
//! Patterns are compiled once at registration time into a regex plus an
//! ordered list of parameter names, then tested against cleaned request
//! paths at dispatch time. A match produces a [`crate::RouteData`] holding
//! the extracted parameter values.
//!
//! ## Pattern syntax
//!
//! - literal segments match themselves: `/users/active`
//! - `:name` matches one non-empty segment: `/users/:id`
//! - a single trailing `*name` matches the rest of the path, slashes
//!   included: `/static/*path`. The remainder may be empty: `/static`
//!   (what path cleaning makes of `/static/`) matches with `path = ""`
//!
//! Precedence among overlapping patterns is first-registered-wins; the
//! table preserves registration order. Matching assumes the request path
//! was cleaned once at context construction and never re-cleans it.

mod core;

pub use core::{ParamVec, RoutePattern, RouteTable, MAX_INLINE_PARAMS};
