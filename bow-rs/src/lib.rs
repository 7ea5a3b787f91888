//! # bow-rs
//!
//! Declarative URL routing for Rust: path templates with named and optional
//! parameters, per-parameter constraints, first-match route tables, and
//! synchronous middleware chains around route handlers.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `bow-rs` to get everything, or on the individual crates
//! for finer-grained control.
//!
//! # Examples
//!
//! ```
//! use bow_rs::prelude::*;
//!
//! let mut routes = RouteTable::builder();
//! routes
//!     .get("/post/:id?", HandlerDescriptor::closure(|req: &Request| {
//!         Ok(Response::ok(match req.param("id") {
//!             Some(id) => format!("post {id}"),
//!             None => "all posts".to_string(),
//!         }))
//!     }))
//!     .name("post");
//!
//! let settings = Settings::default();
//! setup_logging(&settings);
//! let dispatcher = Dispatcher::new(
//!     routes.build().unwrap(),
//!     ControllerRegistry::new(),
//!     MiddlewareRegistry::new(),
//!     &settings,
//! )
//! .unwrap();
//!
//! let response = dispatcher.dispatch(Request::get("/post/5")).unwrap().into_response();
//! assert_eq!(response.body(), "post 5");
//! let response = dispatcher.dispatch(Request::get("/post")).unwrap().into_response();
//! assert_eq!(response.body(), "all posts");
//! ```

/// Error types, settings, settings loading, and logging.
pub use bow_rs_core as core;

/// Request context, URL patterns, route tables, middleware, and dispatch.
#[cfg(feature = "http")]
pub use bow_rs_http as http;

pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;

/// The items most applications need.
pub mod prelude {
    pub use bow_rs_core::logging::setup_logging;
    pub use bow_rs_core::{BowError, BowResult, Settings};

    #[cfg(feature = "http")]
    pub use bow_rs_http::urls::table::{MatchOutcome, RouteTable};
    #[cfg(feature = "http")]
    pub use bow_rs_http::{
        ControllerRegistry, Dispatch, Dispatcher, HandlerDescriptor, Middleware,
        MiddlewareRegistry, Next, ParameterValue, Parameters, Request, Response,
    };
}
