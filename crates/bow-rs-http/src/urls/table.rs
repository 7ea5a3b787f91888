//! Ordered route tables with first-match-wins lookup.
//!
//! Routes are declared on a [`RouteTableBuilder`] during startup and compiled
//! together by [`RouteTableBuilder::build`]. The resulting [`RouteTable`] is
//! never mutated again and can be shared by every request handler.
//!
//! Lookup walks the entries in registration order and stops at the first
//! one whose pattern matches; a later entry that would also match is never
//! considered.

use std::collections::HashMap;

use http::Method;
use tracing::debug;

use bow_rs_core::{BowError, BowResult};

use super::params::Parameters;
use super::route::{RouteEntry, RouteEntryBuilder};
use crate::handler::HandlerDescriptor;
use crate::middleware::MiddlewareRef;

/// Collects route declarations in registration order.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<RouteEntryBuilder>,
}

impl RouteTableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a route accepting every method.
    pub fn define(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        let index = self.entries.len();
        self.entries
            .push(RouteEntryBuilder::new(template, handler.into()));
        &mut self.entries[index]
    }

    /// Declares a route accepting every method. Same as [`define`](Self::define).
    pub fn any(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        self.define(template, handler)
    }

    /// Declares a `GET` route.
    pub fn get(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        self.define(template, handler).methods([Method::GET])
    }

    /// Declares a `POST` route.
    pub fn post(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        self.define(template, handler).methods([Method::POST])
    }

    /// Declares a `PUT` route.
    pub fn put(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        self.define(template, handler).methods([Method::PUT])
    }

    /// Declares a `PATCH` route.
    pub fn patch(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        self.define(template, handler).methods([Method::PATCH])
    }

    /// Declares a `DELETE` route.
    pub fn delete(
        &mut self,
        template: &str,
        handler: impl Into<HandlerDescriptor>,
    ) -> &mut RouteEntryBuilder {
        self.define(template, handler).methods([Method::DELETE])
    }

    /// Number of declared routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [RouteEntryBuilder] {
        &mut self.entries
    }

    /// Compiles every declared route.
    ///
    /// # Errors
    ///
    /// - [`BowError::PatternCompile`] if any template or constraint is invalid.
    /// - [`BowError::ImproperlyConfigured`] if two routes share a name.
    pub fn build(self) -> BowResult<RouteTable> {
        let mut entries = Vec::with_capacity(self.entries.len());
        let mut names: HashMap<String, usize> = HashMap::new();

        for (index, declared) in self.entries.iter().enumerate() {
            if let Some(name) = declared.declared_name() {
                if let Some(previous) = names.insert(name.to_string(), index) {
                    return Err(BowError::ImproperlyConfigured(format!(
                        "Route name '{name}' is used by routes {previous} and {index}"
                    )));
                }
            }
            let entry = declared.build()?;
            debug!(
                index,
                template = entry.template(),
                name = entry.name(),
                handler = %entry.handler(),
                "registered route"
            );
            entries.push(entry);
        }

        Ok(RouteTable { entries, names })
    }
}

/// A successful lookup: the matched entry and its bound parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    index: usize,
    entry: &'a RouteEntry,
    parameters: Parameters,
}

impl<'a> RouteMatch<'a> {
    /// Position of the matched entry in the table.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the matched entry.
    pub const fn entry(&self) -> &'a RouteEntry {
        self.entry
    }

    /// Returns the bound parameters.
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Takes the bound parameters.
    pub fn into_parameters(self) -> Parameters {
        self.parameters
    }

    /// Returns the handler descriptor of the matched entry.
    pub const fn handler(&self) -> &'a HandlerDescriptor {
        self.entry.handler()
    }

    /// Returns the matched entry's middleware in execution order.
    pub fn middleware(&self) -> &'a [MiddlewareRef] {
        self.entry.middleware()
    }

    /// Returns the matched entry's name.
    pub fn name(&self) -> Option<&'a str> {
        self.entry.name()
    }

    /// Returns the matched entry's template.
    pub fn template(&self) -> &'a str {
        self.entry.template()
    }
}

/// The result of looking a path up in a [`RouteTable`].
#[derive(Debug, Clone)]
pub enum MatchOutcome<'a> {
    /// No entry matched the path.
    NoMatch,
    /// The path matched, but only entries restricted to other methods.
    MethodNotAllowed {
        /// Methods accepted by the entries that matched the path.
        allowed: Vec<Method>,
    },
    /// An entry matched.
    Matched(RouteMatch<'a>),
}

impl MatchOutcome<'_> {
    /// Returns `true` for [`MatchOutcome::Matched`].
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// An immutable, ordered collection of compiled routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    names: HashMap<String, usize>,
}

impl RouteTable {
    /// Returns a builder for declaring routes.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Finds the first entry matching `path`, whatever its methods.
    pub fn match_path(&self, path: &str) -> MatchOutcome<'_> {
        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(parameters) = entry.match_path(path) {
                debug!(index, path, template = entry.template(), "route matched");
                return MatchOutcome::Matched(RouteMatch {
                    index,
                    entry,
                    parameters,
                });
            }
        }
        debug!(path, "no route matched");
        MatchOutcome::NoMatch
    }

    /// Finds the first entry matching `path` that accepts `method`.
    ///
    /// Entries restricted to other methods are skipped. If any of them
    /// matched the path, the outcome is [`MatchOutcome::MethodNotAllowed`]
    /// listing their methods.
    pub fn match_request(&self, method: &Method, path: &str) -> MatchOutcome<'_> {
        let mut allowed: Vec<Method> = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            let Some(parameters) = entry.match_path(path) else {
                continue;
            };
            if entry.allows(method) {
                debug!(index, %method, path, template = entry.template(), "route matched");
                return MatchOutcome::Matched(RouteMatch {
                    index,
                    entry,
                    parameters,
                });
            }
            for m in entry.methods() {
                if !allowed.contains(m) {
                    allowed.push(m.clone());
                }
            }
        }

        if allowed.is_empty() {
            debug!(%method, path, "no route matched");
            MatchOutcome::NoMatch
        } else {
            debug!(%method, path, ?allowed, "method not allowed");
            MatchOutcome::MethodNotAllowed { allowed }
        }
    }

    /// Looks up an entry by route name.
    pub fn by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.names.get(name).and_then(|&i| self.entries.get(i))
    }

    /// Returns the entry at `index`.
    pub fn get(&self, index: usize) -> Option<&RouteEntry> {
        self.entries.get(index)
    }

    /// Iterates over the entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;
    use crate::urls::params::ParameterValue;

    fn noop() -> HandlerDescriptor {
        HandlerDescriptor::closure(|_req: &Request| Ok(Response::ok("")))
    }

    fn matched<'a>(outcome: MatchOutcome<'a>) -> RouteMatch<'a> {
        match outcome {
            MatchOutcome::Matched(m) => m,
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let mut routes = RouteTable::builder();
        routes.define("/user/:id", noop()).name("by_id");
        routes.define("/user/me", noop()).name("me");
        let table = routes.build().unwrap();

        let m = matched(table.match_path("/user/me"));
        assert_eq!(m.index(), 0);
        assert_eq!(m.name(), Some("by_id"));
        assert_eq!(m.parameters().get("id"), Some(&ParameterValue::from("me")));
    }

    #[test]
    fn test_literal_first_shadows_parameter() {
        let mut routes = RouteTable::builder();
        routes.define("/user/me", noop());
        routes.define("/user/:id", noop());
        let table = routes.build().unwrap();

        let m = matched(table.match_path("/user/me"));
        assert_eq!(m.template(), "/user/me");
        assert!(m.parameters().is_empty());
        assert_eq!(matched(table.match_path("/user/7")).index(), 1);
    }

    #[test]
    fn test_no_match() {
        let mut routes = RouteTable::builder();
        routes.define("/a", noop());
        let table = routes.build().unwrap();
        assert!(matches!(table.match_path("/b"), MatchOutcome::NoMatch));
        assert!(!table.match_path("/b").is_match());
    }

    #[test]
    fn test_empty_table() {
        let table = RouteTable::builder().build().unwrap();
        assert!(table.is_empty());
        assert!(matches!(table.match_path("/"), MatchOutcome::NoMatch));
    }

    #[test]
    fn test_match_request_filters_methods() {
        let mut routes = RouteTable::builder();
        routes.post("/items", noop()).name("items.store");
        routes.get("/items", noop()).name("items.index");
        let table = routes.build().unwrap();

        let m = matched(table.match_request(&Method::GET, "/items"));
        assert_eq!(m.name(), Some("items.index"));
        let m = matched(table.match_request(&Method::POST, "/items"));
        assert_eq!(m.name(), Some("items.store"));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let mut routes = RouteTable::builder();
        routes.get("/items", noop());
        routes.post("/items", noop());
        routes.get("/items/:id", noop());
        let table = routes.build().unwrap();

        match table.match_request(&Method::DELETE, "/items") {
            MatchOutcome::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, [Method::GET, Method::POST]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            table.match_request(&Method::DELETE, "/nothing"),
            MatchOutcome::NoMatch
        ));
    }

    #[test]
    fn test_match_path_ignores_methods() {
        let mut routes = RouteTable::builder();
        routes.delete("/items/:id", noop());
        let table = routes.build().unwrap();
        assert!(table.match_path("/items/3").is_match());
    }

    #[test]
    fn test_by_name() {
        let mut routes = RouteTable::builder();
        routes.define("/", noop()).name("home");
        routes.define("/about", noop());
        let table = routes.build().unwrap();

        assert_eq!(table.by_name("home").unwrap().template(), "/");
        assert!(table.by_name("about").is_none());
        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().count(), 2);
        assert_eq!(table.get(1).unwrap().template(), "/about");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut routes = RouteTable::builder();
        routes.define("/a", noop()).name("x");
        routes.define("/b", noop()).name("x");
        assert!(matches!(
            routes.build().unwrap_err(),
            BowError::ImproperlyConfigured(_)
        ));
    }

    #[test]
    fn test_bad_constraint_aborts_build() {
        let mut routes = RouteTable::builder();
        routes.define("/ok", noop());
        routes.define("/user/:id", noop()).constraint("id", "[0-9");
        assert!(matches!(
            routes.build().unwrap_err(),
            BowError::PatternCompile(_)
        ));
    }

    #[test]
    fn test_controller_descriptor_from_str() {
        let mut routes = RouteTable::builder();
        routes.get("/", "HomeController@index");
        let table = routes.build().unwrap();
        let m = matched(table.match_path("/"));
        assert_eq!(m.handler().to_string(), "HomeController@index");
    }
}
