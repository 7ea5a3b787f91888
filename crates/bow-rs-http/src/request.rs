//! The request-scoped context handed to middleware and handlers.
//!
//! A [`Request`] is created by the transport for every incoming request and
//! owned by that request alone. The router fills in the resolved URL
//! parameters exactly once, through [`Request::set_url_parameters`], after a
//! route has matched; nothing on the request points back into the route table.

use std::collections::HashMap;
use std::fmt;

use http::Method;

use crate::urls::params::{ParameterValue, Parameters};

/// An incoming request as seen by the router.
#[derive(Clone)]
pub struct Request {
    method: Method,
    path: String,
    query_string: String,
    meta: HashMap<String, String>,
    url_parameters: Parameters,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query_string", &self.query_string)
            .field("url_parameters", &self.url_parameters)
            .finish_non_exhaustive()
    }
}

impl Request {
    /// Returns a builder for constructing a request.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Shorthand for a `GET` request to `uri` (path plus optional query string).
    pub fn get(uri: &str) -> Self {
        Self::builder().uri(uri).build()
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns request metadata. Middleware may use it to pass values along
    /// the chain.
    pub const fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Returns a mutable reference to the request metadata.
    pub fn meta_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.meta
    }

    /// Returns the URL parameters resolved from the matched route, in the
    /// order they appear in the route template.
    pub const fn params(&self) -> &Parameters {
        &self.url_parameters
    }

    /// Returns one resolved URL parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParameterValue> {
        self.url_parameters.get(name)
    }

    /// Attaches the parameters resolved for this request.
    pub fn set_url_parameters(&mut self, parameters: Parameters) {
        self.url_parameters = parameters;
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    meta: HashMap<String, String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            meta: HashMap::new(),
        }
    }
}

impl RequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string.
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Sets path and query string from a request URI such as `/search?q=x`.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        match uri.split_once('?') {
            Some((path, query)) => {
                self.path = path.to_string();
                self.query_string = query.to_string();
            }
            None => {
                self.path = uri.to_string();
                self.query_string.clear();
            }
        }
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    /// Builds the request. URL parameters start out empty.
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            meta: self.meta,
            url_parameters: Parameters::new(),
        }
    }
}
