//! URL routing and resolution.
//!
//! - [`pattern`]: Route templates (`/user/:id`, `/post/:id?`) compiled into
//!   anchored match primitives
//! - [`matcher`]: Matching a compiled pattern against a request path
//! - [`params`]: Typed parameter values bound from captures
//! - [`route`]: Route entries and their registration builder
//! - [`table`]: Ordered, first-match-wins route tables
//! - [`resource`]: RESTful resource route groups
//! - [`reverse`]: URL generation from named routes
//!
//! # Examples
//!
//! ```
//! use bow_rs_http::urls::table::{MatchOutcome, RouteTable};
//! use bow_rs_http::{HandlerDescriptor, ParameterValue, Request, Response};
//!
//! let mut routes = RouteTable::builder();
//! routes.define("/post/:id?", HandlerDescriptor::closure(|_req: &Request| Ok(Response::ok("post"))));
//! let table = routes.build().unwrap();
//!
//! let MatchOutcome::Matched(m) = table.match_path("/post/5") else { panic!("no match") };
//! assert_eq!(m.parameters().get("id"), Some(&ParameterValue::Integer(5)));
//!
//! let MatchOutcome::Matched(m) = table.match_path("/post") else { panic!("no match") };
//! assert!(m.parameters().get("id").is_none());
//! ```

pub mod matcher;
pub mod params;
pub mod pattern;
pub mod resource;
pub mod reverse;
pub mod route;
pub mod table;
