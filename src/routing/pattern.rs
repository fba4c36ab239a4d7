//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile a pattern string into segments plus ordered parameter names
//! - Match a concrete path exactly
//! - Match a path prefix for nested resolution
//!
//! # Design Decisions
//! - `:name` binds one whole, non-empty segment
//! - `*` as the last segment binds the non-empty remainder, `/` included
//! - `*` anywhere else, or a bare `:`, is an ordinary literal
//! - Values are bound verbatim; percent-decoding is left to the caller
//! - Only duplicate parameter names fail compilation

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::routing::RouteError;

/// Parameter bindings of one match level.
pub type Params = HashMap<String, String>;

/// Parameter name under which a trailing wildcard is captured.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A compiled route pattern. Built once, reused for every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    pattern: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
}

/// Split a path into segments after its leading `/`.
///
/// `/` yields no segments; a trailing `/` yields a trailing empty segment,
/// so `/a` and `/a/` stay distinct. Paths without a leading `/` yield `None`.
pub(crate) fn split_path(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    Some(split_rest(rest))
}

fn split_rest(rest: &str) -> Vec<&str> {
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    }
}

impl CompiledRoute {
    /// Compile a pattern such as `/user/:id/post/:postId` or `/files/*`.
    ///
    /// A leading `/` is optional; `about` and `/about` compile alike.
    pub fn compile(pattern: &str) -> Result<Self, RouteError> {
        let raw = split_rest(pattern.strip_prefix('/').unwrap_or(pattern));
        let last = raw.len().saturating_sub(1);

        let mut segments = Vec::with_capacity(raw.len());
        let mut param_names = Vec::new();
        let mut seen = HashSet::new();

        for (i, segment) in raw.iter().enumerate() {
            let compiled = match *segment {
                WILDCARD if i == last => Segment::Wildcard,
                s => match s.strip_prefix(':') {
                    Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                    _ => Segment::Literal(s.to_string()),
                },
            };

            let name = match &compiled {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Wildcard => Some(WILDCARD),
                Segment::Literal(_) => None,
            };
            if let Some(name) = name {
                if !seen.insert(name.to_string()) {
                    return Err(RouteError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                param_names.push(name.to_string());
            }

            segments.push(compiled);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            param_names,
        })
    }

    /// The pattern this route was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names, left to right. A trailing wildcard appears as `*`.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// True when the pattern has no parameters or wildcard.
    pub fn is_literal(&self) -> bool {
        self.param_names.is_empty()
    }

    /// Match a full path. Returns the bindings, or `None` on mismatch.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let segments = split_path(path)?;
        let (params, consumed) = self.match_prefix(&segments)?;
        (consumed == segments.len()).then_some(params)
    }

    /// Match the leading segments of a path.
    ///
    /// Returns the bindings and the number of segments consumed.
    pub(crate) fn match_prefix(&self, segments: &[&str]) -> Option<(Params, usize)> {
        let mut params = Params::new();

        for (i, expected) in self.segments.iter().enumerate() {
            match expected {
                Segment::Literal(literal) => {
                    if *segments.get(i)? != literal.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = *segments.get(i)?;
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), value.to_string());
                }
                Segment::Wildcard => {
                    let rest = segments[i..].join("/");
                    if rest.is_empty() {
                        return None;
                    }
                    params.insert(WILDCARD.to_string(), rest);
                    return Some((params, segments.len()));
                }
            }
        }

        Some((params, self.segments.len()))
    }
}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
