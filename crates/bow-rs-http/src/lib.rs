//! # bow-rs-http
//!
//! HTTP routing for the bow-rs framework. Provides the request context and
//! response types, declarative URL patterns with named and optional
//! parameters, first-match route tables, and synchronous middleware chains
//! wrapped around route handlers.
//!
//! # Examples
//!
//! ```
//! use bow_rs_http::urls::table::RouteTable;
//! use bow_rs_http::{Dispatch, Dispatcher, HandlerDescriptor, Request, Response};
//! use bow_rs_http::{ControllerRegistry, MiddlewareRegistry};
//! use bow_rs_core::Settings;
//!
//! let mut routes = RouteTable::builder();
//! routes
//!     .define(
//!         "/user/:id",
//!         HandlerDescriptor::closure(|req: &Request| {
//!             Ok(Response::ok(format!("user {}", req.param("id").unwrap())))
//!         }),
//!     )
//!     .constraint("id", "[0-9]+")
//!     .name("user.show");
//! let table = routes.build().unwrap();
//!
//! let dispatcher = Dispatcher::new(
//!     table,
//!     ControllerRegistry::new(),
//!     MiddlewareRegistry::new(),
//!     &Settings::default(),
//! )
//! .unwrap();
//!
//! match dispatcher.dispatch(Request::get("/user/42")).unwrap() {
//!     Dispatch::Handled(response) => assert_eq!(response.body(), "user 42"),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod dispatcher;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod urls;

pub use dispatcher::{Dispatch, Dispatcher};
pub use handler::{ControllerRegistry, Handler, HandlerDescriptor};
pub use middleware::{Middleware, MiddlewareChain, MiddlewareRef, MiddlewareRegistry, Next};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use urls::params::{ParameterValue, Parameters};
