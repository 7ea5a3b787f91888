//! Synchronous middleware chains wrapped around route handlers.
//!
//! Routes name their middleware through [`MiddlewareRef`]s (`"auth"`,
//! `"throttle:60,1"`). When the dispatcher is built, each reference is looked
//! up in a [`MiddlewareRegistry`] and the route's list becomes a resolved
//! [`MiddlewareChain`].
//!
//! Each middleware receives the request, its arguments, and a [`Next`]
//! continuation. Calling [`Next::run`] proceeds down the chain and finally
//! into the handler; returning without calling it short-circuits the chain,
//! and the middleware's own result is what the dispatcher returns.
//!
//! # Examples
//!
//! ```
//! use bow_rs_http::middleware::{from_fn, MiddlewareRef, MiddlewareRegistry, Next};
//! use bow_rs_http::{Handler, Request, Response};
//! use std::sync::Arc;
//!
//! let mut registry = MiddlewareRegistry::new();
//! registry.register(
//!     "deny",
//!     from_fn(|_req: &mut Request, _args: &[String], _next: Next<'_>| {
//!         Ok(Response::with_status(http::StatusCode::FORBIDDEN, "denied"))
//!     }),
//! );
//!
//! let chain = registry.resolve(&[MiddlewareRef::parse("deny")]).unwrap();
//! let handler: Handler = Arc::new(|_req: &Request| Ok(Response::ok("secret")));
//! let response = chain.run(&mut Request::get("/"), &handler).unwrap();
//! assert_eq!(response.body(), "denied");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};

use bow_rs_core::{BowError, BowResult};

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;

/// A reference to a registered middleware, with optional arguments.
///
/// The textual form is `name` or `name:arg1,arg2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MiddlewareRef {
    name: String,
    args: Vec<String>,
}

impl MiddlewareRef {
    /// Creates a reference without arguments.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// Creates a reference with arguments.
    pub fn with_args(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }

    /// Parses `name` or `name:arg1,arg2`. Surrounding whitespace is trimmed
    /// and empty arguments are dropped.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.split_once(':') {
            Some((name, args)) => Self {
                name: name.trim().to_string(),
                args: args
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect(),
            },
            None => Self::new(text),
        }
    }

    /// Returns the middleware name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments passed to the middleware.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            write!(f, ":{}", self.args.join(","))?;
        }
        Ok(())
    }
}

impl From<&str> for MiddlewareRef {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for MiddlewareRef {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

/// Anything that can be attached to a route as a list of middleware: a
/// single reference or an ordered collection of them.
pub trait IntoMiddlewareList {
    /// Converts into references, keeping order.
    fn into_middleware_list(self) -> Vec<MiddlewareRef>;
}

impl IntoMiddlewareList for &str {
    fn into_middleware_list(self) -> Vec<MiddlewareRef> {
        vec![MiddlewareRef::parse(self)]
    }
}

impl IntoMiddlewareList for String {
    fn into_middleware_list(self) -> Vec<MiddlewareRef> {
        vec![MiddlewareRef::parse(&self)]
    }
}

impl IntoMiddlewareList for MiddlewareRef {
    fn into_middleware_list(self) -> Vec<MiddlewareRef> {
        vec![self]
    }
}

impl IntoMiddlewareList for &[&str] {
    fn into_middleware_list(self) -> Vec<MiddlewareRef> {
        self.iter().map(|s| MiddlewareRef::parse(s)).collect()
    }
}

impl<T: Into<MiddlewareRef>> IntoMiddlewareList for Vec<T> {
    fn into_middleware_list(self) -> Vec<MiddlewareRef> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<MiddlewareRef>, const N: usize> IntoMiddlewareList for [T; N] {
    fn into_middleware_list(self) -> Vec<MiddlewareRef> {
        self.into_iter().map(Into::into).collect()
    }
}

/// A middleware component.
///
/// Implemented for every closure of the matching shape; use [`from_fn`] to
/// have the closure's argument types inferred.
pub trait Middleware: Send + Sync {
    /// Handles the request, calling `next.run(request)` to proceed.
    ///
    /// # Errors
    ///
    /// Errors from the middleware itself or from the rest of the chain are
    /// returned to the dispatcher's caller unmodified.
    fn handle(&self, request: &mut Request, args: &[String], next: Next<'_>) -> BowResult<Response>;
}

impl<F> Middleware for F
where
    F: Fn(&mut Request, &[String], Next<'_>) -> BowResult<Response> + Send + Sync,
{
    fn handle(&self, request: &mut Request, args: &[String], next: Next<'_>) -> BowResult<Response> {
        self(request, args, next)
    }
}

/// Pins a closure to the middleware signature.
pub const fn from_fn<F>(f: F) -> F
where
    F: Fn(&mut Request, &[String], Next<'_>) -> BowResult<Response> + Send + Sync,
{
    f
}

#[derive(Clone)]
struct Link {
    reference: MiddlewareRef,
    middleware: Arc<dyn Middleware>,
}

/// The rest of a middleware chain, ending in the route handler.
pub struct Next<'a> {
    links: &'a [Link],
    handler: &'a Handler,
}

impl Next<'_> {
    /// Runs the remaining middleware, then the handler.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by a middleware or the handler.
    pub fn run(self, request: &mut Request) -> BowResult<Response> {
        match self.links.split_first() {
            Some((link, rest)) => {
                trace!(middleware = %link.reference, "entering middleware");
                link.middleware.handle(
                    request,
                    link.reference.args(),
                    Next {
                        links: rest,
                        handler: self.handler,
                    },
                )
            }
            None => (self.handler)(&*request),
        }
    }

    /// Number of middleware still to run before the handler.
    pub const fn remaining(&self) -> usize {
        self.links.len()
    }
}

/// An ordered, resolved middleware list.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    links: Vec<Link>,
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.links.iter().map(|l| l.reference.to_string()))
            .finish()
    }
}

impl MiddlewareChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a chain running `self` first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        let mut links = self.links.clone();
        links.extend(other.links.iter().cloned());
        Self { links }
    }

    /// Returns the references in execution order.
    pub fn references(&self) -> impl Iterator<Item = &MiddlewareRef> {
        self.links.iter().map(|l| &l.reference)
    }

    /// Number of middleware in the chain.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Runs the chain around `handler`.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by a middleware or the handler.
    pub fn run(&self, request: &mut Request, handler: &Handler) -> BowResult<Response> {
        Next {
            links: &self.links,
            handler,
        }
        .run(request)
    }
}

/// Middleware by name.
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.middleware.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry")
            .field("names", &names)
            .finish()
    }
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `middleware` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.insert(name.to_string(), Arc::new(middleware));
        self
    }

    /// Looks up a middleware by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(name).cloned()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.middleware.contains_key(name)
    }

    /// Resolves references into a chain, keeping their order and duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`BowError::ImproperlyConfigured`] for the first reference
    /// whose name is not registered.
    pub fn resolve(&self, references: &[MiddlewareRef]) -> BowResult<MiddlewareChain> {
        let links = references
            .iter()
            .map(|reference| -> BowResult<Link> {
                let middleware = self.get(reference.name()).ok_or_else(|| {
                    warn!(middleware = %reference, "unresolved middleware reference");
                    BowError::ImproperlyConfigured(format!(
                        "Middleware '{}' is not registered",
                        reference.name()
                    ))
                })?;
                Ok(Link {
                    reference: reference.clone(),
                    middleware,
                })
            })
            .collect::<BowResult<Vec<_>>>()?;
        Ok(MiddlewareChain { links })
    }
}
