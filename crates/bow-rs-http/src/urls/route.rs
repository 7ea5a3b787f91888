//! Route entries and the builder used to declare them.
//!
//! A [`RouteEntryBuilder`] collects everything declared for one route:
//! middleware, name, constraints and allowed methods. The table compiles it
//! into an immutable [`RouteEntry`] once registration is over.

use http::Method;

use bow_rs_core::PatternCompileError;

use super::params::{bind, Parameters};
use super::pattern::{ConstraintMap, RoutePattern};
use crate::handler::HandlerDescriptor;
use crate::middleware::{IntoMiddlewareList, MiddlewareRef};

/// A compiled route: pattern, handler, middleware, name and methods.
///
/// Immutable once built and free of per-request state.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: RoutePattern,
    handler: HandlerDescriptor,
    middleware: Vec<MiddlewareRef>,
    name: Option<String>,
    methods: Vec<Method>,
    constraints: ConstraintMap,
}

impl RouteEntry {
    /// Returns the compiled pattern.
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Returns the normalized template.
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// Returns the handler descriptor.
    pub const fn handler(&self) -> &HandlerDescriptor {
        &self.handler
    }

    /// Returns the middleware references in execution order.
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    /// Returns the route name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the allowed methods; empty means every method.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the constraints the pattern was compiled with.
    pub const fn constraints(&self) -> &ConstraintMap {
        &self.constraints
    }

    /// Returns `true` if this route accepts `method`.
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    /// Matches `path` and binds the captured parameters.
    pub fn match_path(&self, path: &str) -> Option<Parameters> {
        let result = self.pattern.matches(path)?;
        Some(bind(self.pattern.parameter_names(), &result))
    }

    /// Matches `path` under `constraints` instead of the route's own ones.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternCompileError`] if `constraints` do not fit the
    /// template.
    pub fn match_with(
        &self,
        path: &str,
        constraints: &ConstraintMap,
    ) -> Result<Option<Parameters>, PatternCompileError> {
        Ok(self
            .pattern
            .match_with(path, constraints)?
            .map(|result| bind(self.pattern.parameter_names(), &result)))
    }
}

/// Declares one route. Returned by [`define`](super::table::RouteTableBuilder::define)
/// and its method shortcuts; every setter chains.
#[derive(Debug, Clone)]
pub struct RouteEntryBuilder {
    template: String,
    handler: HandlerDescriptor,
    middleware: Vec<MiddlewareRef>,
    name: Option<String>,
    constraints: ConstraintMap,
    methods: Vec<Method>,
}

impl RouteEntryBuilder {
    pub(crate) fn new(template: &str, handler: HandlerDescriptor) -> Self {
        Self {
            template: template.to_string(),
            handler,
            middleware: Vec::new(),
            name: None,
            constraints: ConstraintMap::new(),
            methods: Vec::new(),
        }
    }

    /// Adds middleware in front of what the route already has.
    ///
    /// Each call's list keeps its own order but runs before every list added
    /// earlier: `.middleware("a").middleware(["b", "c"])` runs `b, c, a`.
    /// Duplicates are kept.
    pub fn middleware(&mut self, list: impl IntoMiddlewareList) -> &mut Self {
        let mut added = list.into_middleware_list();
        added.append(&mut self.middleware);
        self.middleware = added;
        self
    }

    /// Names the route.
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Restricts what `parameter` may capture to `pattern`.
    pub fn constraint(&mut self, parameter: &str, pattern: &str) -> &mut Self {
        self.constraints
            .insert(parameter.to_string(), pattern.to_string());
        self
    }

    /// Adds several constraints at once.
    pub fn constraints<I, K, V>(&mut self, constraints: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.constraints
            .extend(constraints.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Restricts the route to `methods`, replacing any earlier restriction.
    pub fn methods<I: IntoIterator<Item = Method>>(&mut self, methods: I) -> &mut Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Returns the declared template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the middleware declared so far, in execution order.
    pub fn declared_middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    pub(crate) fn declared_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Compiles the route.
    pub(crate) fn build(&self) -> Result<RouteEntry, PatternCompileError> {
        Ok(RouteEntry {
            pattern: RoutePattern::compile(&self.template, &self.constraints)?,
            handler: self.handler.clone(),
            middleware: self.middleware.clone(),
            name: self.name.clone(),
            methods: self.methods.clone(),
            constraints: self.constraints.clone(),
        })
    }
}
