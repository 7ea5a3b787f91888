//! Matching compiled route patterns against request paths.
//!
//! Matching runs in a fixed order and stops as soon as the outcome is known:
//!
//! 1. both the template and the path lose one trailing `/` (root excepted);
//! 2. a path equal to the template matches with no captures;
//! 3. a path whose `/`-separated piece count fits neither the full template
//!    nor the template without its `/:name?` parameters is rejected;
//! 4. the anchored primitive runs, and captured values lose any `/`.
//!
//! Not matching is an ordinary outcome (`None`), never an error.

use tracing::trace;

use bow_rs_core::PatternCompileError;

use super::pattern::{normalize_path, ConstraintMap, RoutePattern};

/// Raw captures of a successful match, aligned with
/// [`RoutePattern::parameter_names`].
///
/// An optional parameter that did not take part in the match is `None`, not
/// an empty string. A match through the exact-template fast path carries no
/// captures at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    captures: Vec<Option<String>>,
}

impl MatchResult {
    /// Creates a result from positional captures.
    pub const fn new(captures: Vec<Option<String>>) -> Self {
        Self { captures }
    }

    /// Returns the captures in parameter order.
    pub fn captures(&self) -> &[Option<String>] {
        &self.captures
    }

    /// Returns the capture at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.captures.get(index)?.as_deref()
    }

    /// Number of capture slots.
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Returns `true` if there are no capture slots.
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

impl RoutePattern {
    /// Tests `path` against this pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use bow_rs_http::urls::pattern::RoutePattern;
    ///
    /// let pattern = RoutePattern::new("/user/:id").unwrap();
    /// assert_eq!(pattern.matches("/user/42").unwrap().get(0), Some("42"));
    /// assert!(pattern.matches("/user/42/edit").is_none());
    /// assert!(pattern.matches("/user").is_none());
    /// ```
    pub fn matches(&self, path: &str) -> Option<MatchResult> {
        let path = normalize_path(path);

        if self.template() == path {
            trace!(template = self.template(), "exact template match");
            return Some(MatchResult::default());
        }

        let segments = path.split('/').count();
        if segments != self.segment_count() && segments != self.required_segment_count() {
            trace!(
                template = self.template(),
                path,
                segments,
                "segment count mismatch"
            );
            return None;
        }

        let captures = self.primitive().captures(path)?;
        let values = self
            .parameters()
            .iter()
            .map(|spec| captures.name(spec.group()).map(|m| m.as_str().replace('/', "")))
            .collect();

        Some(MatchResult::new(values))
    }

    /// Returns `true` if `path` matches this pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.matches(path).is_some()
    }

    /// Tests `path` against this pattern's template narrowed by `constraints`.
    ///
    /// The primitive is built from the template and `constraints` for this
    /// call only; nothing is kept on `self`, so the same pattern can be tested
    /// with different constraint maps from different threads.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternCompileError`] if a constraint is invalid or names
    /// an unknown parameter.
    pub fn match_with(
        &self,
        path: &str,
        constraints: &ConstraintMap,
    ) -> Result<Option<MatchResult>, PatternCompileError> {
        Ok(Self::compile(self.template(), constraints)?.matches(path))
    }
}
