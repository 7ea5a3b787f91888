//! Request dispatch through a route table.
//!
//! A [`Dispatcher`] owns a built [`RouteTable`] together with every route's
//! resolved handler and middleware chain. Resolution happens once, in
//! [`Dispatcher::new`]: a controller action or middleware name that cannot
//! be found stops startup instead of failing a request later.
//!
//! For each request the dispatcher finds the first route accepting its
//! method and path, attaches the bound parameters to the request, and runs
//! the global middleware, then the route's middleware, then the handler.

use http::Method;
use tracing::{debug, warn};

use bow_rs_core::logging::request_span;
use bow_rs_core::{BowError, BowResult, Settings};

use crate::handler::{ControllerRegistry, Handler};
use crate::middleware::{MiddlewareChain, MiddlewareRef, MiddlewareRegistry};
use crate::request::Request;
use crate::response::Response;
use crate::urls::table::{MatchOutcome, RouteTable};

/// What happened to a dispatched request.
#[derive(Debug)]
pub enum Dispatch {
    /// A route matched; this is what its chain returned, whether from the
    /// handler or from a short-circuiting middleware.
    Handled(Response),
    /// No route matched the path.
    NotFound,
    /// Routes matched the path, but none accepts the request method.
    MethodNotAllowed {
        /// Methods accepted by the routes that matched.
        allowed: Vec<Method>,
    },
}

impl Dispatch {
    /// Turns the outcome into a response: `404` and `405` for the unmatched
    /// cases, the latter with an `Allow` header.
    pub fn into_response(self) -> Response {
        match self {
            Self::Handled(response) => response,
            Self::NotFound => Response::not_found("Not Found"),
            Self::MethodNotAllowed { allowed } => {
                Response::with_status(http::StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
                    .header("allow", &allow_header(&allowed))
            }
        }
    }

    /// Turns the outcome into a result, reporting the unmatched cases as
    /// [`BowError::NotFound`] and [`BowError::MethodNotAllowed`].
    ///
    /// # Errors
    ///
    /// Returns an error unless a route handled the request.
    pub fn into_result(self) -> BowResult<Response> {
        match self {
            Self::Handled(response) => Ok(response),
            Self::NotFound => Err(BowError::NotFound("No route matches the path".into())),
            Self::MethodNotAllowed { allowed } => {
                Err(BowError::MethodNotAllowed(allow_header(&allowed)))
            }
        }
    }
}

fn allow_header(allowed: &[Method]) -> String {
    allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
struct ResolvedRoute {
    handler: Handler,
    chain: MiddlewareChain,
}

/// Routes requests to handlers through their middleware chains.
///
/// Immutable after construction and shareable across threads.
#[derive(Clone)]
pub struct Dispatcher {
    table: RouteTable,
    routes: Vec<ResolvedRoute>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Resolves every route of `table` against the registries.
    ///
    /// Controller actions without a namespace are looked up under
    /// `settings.controller_namespace`; `settings.global_middleware` runs in
    /// front of every route's own middleware.
    ///
    /// # Errors
    ///
    /// Returns [`BowError::ImproperlyConfigured`] if a controller action or a
    /// middleware name cannot be resolved.
    pub fn new(
        table: RouteTable,
        controllers: ControllerRegistry,
        middleware: MiddlewareRegistry,
        settings: &Settings,
    ) -> BowResult<Self> {
        let global: Vec<MiddlewareRef> = settings
            .global_middleware
            .iter()
            .map(|text| MiddlewareRef::parse(text))
            .collect();
        let global = middleware.resolve(&global)?;
        let namespace = settings.controller_namespace.as_deref();

        let mut routes = Vec::with_capacity(table.len());
        for entry in table.iter() {
            let handler = controllers
                .resolve(entry.handler(), namespace)
                .ok_or_else(|| {
                    warn!(
                        template = entry.template(),
                        handler = %entry.handler(),
                        "unresolved route handler"
                    );
                    BowError::ImproperlyConfigured(format!(
                        "Handler '{}' of route '{}' is not registered",
                        entry.handler(),
                        entry.template()
                    ))
                })?;
            let chain = global.then(&middleware.resolve(entry.middleware())?);
            debug!(
                template = entry.template(),
                chain = ?chain,
                "resolved route"
            );
            routes.push(ResolvedRoute { handler, chain });
        }

        Ok(Self { table, routes })
    }

    /// Returns the route table.
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Dispatches one request.
    ///
    /// # Errors
    ///
    /// Errors raised by middleware or the handler are returned unmodified.
    /// Not finding a route is not an error.
    pub fn dispatch(&self, mut request: Request) -> BowResult<Dispatch> {
        let span = request_span(request.method().as_str(), request.path());
        let _enter = span.enter();

        let route_match = match self.table.match_request(request.method(), request.path()) {
            MatchOutcome::Matched(route_match) => route_match,
            MatchOutcome::NoMatch => return Ok(Dispatch::NotFound),
            MatchOutcome::MethodNotAllowed { allowed } => {
                return Ok(Dispatch::MethodNotAllowed { allowed });
            }
        };

        let index = route_match.index();
        let resolved = self.routes.get(index).ok_or_else(|| {
            BowError::InternalServerError(format!("Route {index} has no resolved handler"))
        })?;
        request.set_url_parameters(route_match.into_parameters());

        debug!(index, chain = resolved.chain.len(), "dispatching");
        resolved
            .chain
            .run(&mut request, &resolved.handler)
            .map(Dispatch::Handled)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::handler::HandlerDescriptor;
    use crate::middleware::{from_fn, Next};

    fn echo_id() -> HandlerDescriptor {
        HandlerDescriptor::closure(|req: &Request| {
            Ok(Response::ok(
                req.param("id").map(ToString::to_string).unwrap_or_default(),
            ))
        })
    }

    fn body(outcome: Dispatch) -> String {
        match outcome {
            Dispatch::Handled(response) => response.body().to_string(),
            other => panic!("expected a response, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_binds_parameters() {
        let mut routes = RouteTable::builder();
        routes.define("/user/:id", echo_id());
        let dispatcher = Dispatcher::new(
            routes.build().unwrap(),
            ControllerRegistry::new(),
            MiddlewareRegistry::new(),
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(body(dispatcher.dispatch(Request::get("/user/42")).unwrap()), "42");
        assert!(matches!(
            dispatcher.dispatch(Request::get("/nope")).unwrap(),
            Dispatch::NotFound
        ));
    }

    #[test]
    fn test_method_not_allowed() {
        let mut routes = RouteTable::builder();
        routes.get("/items", echo_id());
        let dispatcher = Dispatcher::new(
            routes.build().unwrap(),
            ControllerRegistry::new(),
            MiddlewareRegistry::new(),
            &Settings::default(),
        )
        .unwrap();

        let request = Request::builder().method(Method::POST).path("/items").build();
        let response = dispatcher.dispatch(request).unwrap().into_response();
        assert_eq!(response.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header_value("Allow"), Some("GET"));
    }

    #[test]
    fn test_controller_resolved_with_default_namespace() {
        let mut controllers = ControllerRegistry::new();
        controllers.register("app::UserController", "show", |req: &Request| {
            Ok(Response::ok(format!("show {}", req.param("id").unwrap())))
        });
        let mut routes = RouteTable::builder();
        routes.get("/user/:id", "UserController@show");

        let settings = Settings {
            controller_namespace: Some("app".into()),
            ..Settings::default()
        };
        let dispatcher = Dispatcher::new(
            routes.build().unwrap(),
            controllers,
            MiddlewareRegistry::new(),
            &settings,
        )
        .unwrap();

        assert_eq!(body(dispatcher.dispatch(Request::get("/user/3")).unwrap()), "show 3");
    }

    #[test]
    fn test_unresolved_controller_fails_construction() {
        let mut routes = RouteTable::builder();
        routes.get("/", "Missing@index");
        let err = Dispatcher::new(
            routes.build().unwrap(),
            ControllerRegistry::new(),
            MiddlewareRegistry::new(),
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BowError::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_unresolved_middleware_fails_construction() {
        let mut routes = RouteTable::builder();
        routes.define("/", echo_id()).middleware("ghost");
        let err = Dispatcher::new(
            routes.build().unwrap(),
            ControllerRegistry::new(),
            MiddlewareRegistry::new(),
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BowError::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_global_middleware_runs_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = MiddlewareRegistry::new();
        for name in ["global", "route"] {
            let log = Arc::clone(&log);
            registry.register(
                name,
                from_fn(move |req: &mut Request, _args: &[String], next: Next<'_>| {
                    log.lock().unwrap().push(name);
                    next.run(req)
                }),
            );
        }

        let mut routes = RouteTable::builder();
        routes.define("/", echo_id()).middleware("route");
        let settings = Settings {
            global_middleware: vec!["global".into()],
            ..Settings::default()
        };
        let dispatcher =
            Dispatcher::new(routes.build().unwrap(), ControllerRegistry::new(), registry, &settings)
                .unwrap();

        dispatcher.dispatch(Request::get("/")).unwrap();
        assert_eq!(*log.lock().unwrap(), ["global", "route"]);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut routes = RouteTable::builder();
        routes.define(
            "/boom",
            HandlerDescriptor::closure(|_req: &Request| {
                Err(BowError::InternalServerError("boom".into()))
            }),
        );
        let dispatcher = Dispatcher::new(
            routes.build().unwrap(),
            ControllerRegistry::new(),
            MiddlewareRegistry::new(),
            &Settings::default(),
        )
        .unwrap();

        let err = dispatcher.dispatch(Request::get("/boom")).unwrap_err();
        assert!(matches!(err, BowError::InternalServerError(ref m) if m == "boom"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_unmatched_outcomes_as_errors() {
        let err = Dispatch::MethodNotAllowed {
            allowed: vec![Method::GET, Method::PUT],
        }
        .into_result()
        .unwrap_err();
        assert!(matches!(err, BowError::MethodNotAllowed(ref m) if m == "GET, PUT"));
        assert_eq!(err.status_code(), 405);

        let err = Dispatch::NotFound.into_result().unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(Dispatch::Handled(Response::ok("")).into_result().is_ok());
    }

    #[test]
    fn test_not_found_response() {
        let response = Dispatch::NotFound.into_response();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }
}
