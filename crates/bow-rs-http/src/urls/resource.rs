//! RESTful resource route groups.
//!
//! [`RouteTableBuilder::resource`] declares the seven conventional routes of
//! a resource controller in one call:
//!
//! | Method        | Template            | Action    |
//! |---------------|---------------------|-----------|
//! | `GET`         | `prefix`            | `index`   |
//! | `GET`         | `prefix/create`     | `create`  |
//! | `POST`        | `prefix`            | `store`   |
//! | `GET`         | `prefix/:id`        | `show`    |
//! | `GET`         | `prefix/:id/edit`   | `edit`    |
//! | `PUT`, `PATCH`| `prefix/:id`        | `update`  |
//! | `DELETE`      | `prefix/:id`        | `destroy` |
//!
//! Each route is named `<resource>.<action>`, `<resource>` being the last
//! literal segment of the prefix. `create` comes before `:id` so that
//! `/photos/create` is not taken for a `show`.

use std::ops::Range;

use http::Method;

use super::pattern::{normalize_path, tokenize, Token};
use super::table::RouteTableBuilder;
use crate::handler::HandlerDescriptor;
use crate::middleware::IntoMiddlewareList;

/// The actions of a resource controller, in registration order.
pub const RESOURCE_ACTIONS: [&str; 7] = [
    "index", "create", "store", "show", "edit", "update", "destroy",
];

/// The routes declared by one [`RouteTableBuilder::resource`] call.
///
/// Setters apply to every route of the group.
#[derive(Debug)]
pub struct ResourceRoutes<'a> {
    builder: &'a mut RouteTableBuilder,
    range: Range<usize>,
}

impl ResourceRoutes<'_> {
    /// Adds middleware to every route of the resource, in front of what each
    /// already has.
    pub fn middleware<L>(&mut self, list: L) -> &mut Self
    where
        L: IntoMiddlewareList + Clone,
    {
        for entry in &mut self.builder.entries_mut()[self.range.clone()] {
            entry.middleware(list.clone());
        }
        self
    }

    /// Restricts `parameter` on every route of the resource that declares it.
    pub fn constraint(&mut self, parameter: &str, pattern: &str) -> &mut Self {
        for entry in &mut self.builder.entries_mut()[self.range.clone()] {
            let declares = tokenize(entry.template()).iter().any(
                |token| matches!(token, Token::Parameter { name, .. } if name == parameter),
            );
            if declares {
                entry.constraint(parameter, pattern);
            }
        }
        self
    }

    /// Number of routes in the group.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns `true` if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl RouteTableBuilder {
    /// Declares the seven routes of a resource controller under `prefix`.
    ///
    /// `controller` is the controller name, optionally prefixed by a
    /// `::`-separated namespace (`admin::PhotoController`).
    ///
    /// # Examples
    ///
    /// ```
    /// use bow_rs_http::urls::table::{MatchOutcome, RouteTable};
    ///
    /// let mut routes = RouteTable::builder();
    /// routes.resource("/photos", "PhotoController");
    /// let table = routes.build().unwrap();
    ///
    /// let MatchOutcome::Matched(m) = table.match_request(&http::Method::GET, "/photos/3/edit") else {
    ///     panic!("no match");
    /// };
    /// assert_eq!(m.name(), Some("photos.edit"));
    /// assert_eq!(m.handler().to_string(), "PhotoController@edit");
    /// ```
    pub fn resource(&mut self, prefix: &str, controller: &str) -> ResourceRoutes<'_> {
        let prefix = normalize_path(prefix).trim_end_matches('/');
        let resource = resource_name(prefix);
        let (namespace, controller) = match controller.rsplit_once("::") {
            Some((ns, name)) => (Some(ns), name),
            None => (None, controller),
        };

        let start = self.len();
        let routes: [(&str, &[Method], &str); 7] = [
            ("", &[Method::GET], "index"),
            ("/create", &[Method::GET], "create"),
            ("", &[Method::POST], "store"),
            ("/:id", &[Method::GET], "show"),
            ("/:id/edit", &[Method::GET], "edit"),
            ("/:id", &[Method::PUT, Method::PATCH], "update"),
            ("/:id", &[Method::DELETE], "destroy"),
        ];

        for (suffix, methods, action) in routes {
            let template = match (prefix, suffix) {
                ("", "") => "/".to_string(),
                _ => format!("{prefix}{suffix}"),
            };
            let mut handler = HandlerDescriptor::controller(controller, action);
            if let Some(ns) = namespace {
                handler = handler.in_namespace(ns);
            }
            let entry = self.define(&template, handler);
            entry.methods(methods.iter().cloned());
            if !resource.is_empty() {
                entry.name(&format!("{resource}.{action}"));
            }
        }

        ResourceRoutes {
            range: start..self.len(),
            builder: self,
        }
    }
}

/// The last literal segment of `prefix`, e.g. `photos` for `/user/:uid/photos`.
fn resource_name(prefix: &str) -> &str {
    prefix
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.starts_with(':'))
        .unwrap_or("")
}
