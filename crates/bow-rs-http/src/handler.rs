//! Route handlers and controller lookup.
//!
//! A route names its terminal handler through a [`HandlerDescriptor`]: either
//! a closure stored directly on the route, or a controller action
//! (`namespace::Controller@method`) looked up in a [`ControllerRegistry`]
//! when the dispatcher is built.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bow_rs_core::{BowError, BowResult};

use crate::request::Request;
use crate::response::Response;

/// The terminal handler of a route.
pub type Handler = Arc<dyn Fn(&Request) -> BowResult<Response> + Send + Sync>;

/// What a route runs once its middleware chain has been passed.
#[derive(Clone)]
pub enum HandlerDescriptor {
    /// A handler stored directly on the route.
    Closure(Handler),
    /// A controller action resolved through a [`ControllerRegistry`].
    ControllerMethod {
        /// The namespace the controller lives in; `None` falls back to the
        /// configured default namespace.
        namespace: Option<String>,
        /// The controller name.
        controller: String,
        /// The action name.
        method: String,
    },
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => f.write_str("Closure(..)"),
            Self::ControllerMethod {
                namespace,
                controller,
                method,
            } => f
                .debug_struct("ControllerMethod")
                .field("namespace", namespace)
                .field("controller", controller)
                .field("method", method)
                .finish(),
        }
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => f.write_str("<closure>"),
            Self::ControllerMethod {
                namespace: Some(ns),
                controller,
                method,
            } => write!(f, "{ns}::{controller}@{method}"),
            Self::ControllerMethod {
                namespace: None,
                controller,
                method,
            } => write!(f, "{controller}@{method}"),
        }
    }
}

impl HandlerDescriptor {
    /// Wraps a closure.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Request) -> BowResult<Response> + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(f))
    }

    /// Names a controller action without a namespace.
    pub fn controller(controller: &str, method: &str) -> Self {
        Self::ControllerMethod {
            namespace: None,
            controller: controller.to_string(),
            method: method.to_string(),
        }
    }

    /// Parses the textual action form `Controller@method`, optionally
    /// prefixed by a `::`-separated namespace (`admin::UserController@show`).
    ///
    /// # Errors
    ///
    /// Returns [`BowError::ImproperlyConfigured`] if the `@` separator is
    /// missing or the controller or method is empty.
    pub fn action(text: &str) -> BowResult<Self> {
        let (path, method) = text.rsplit_once('@').ok_or_else(|| {
            BowError::ImproperlyConfigured(format!(
                "Handler '{text}' is not of the form 'Controller@method'"
            ))
        })?;
        let (namespace, controller) = match path.rsplit_once("::") {
            Some((ns, controller)) => (Some(ns.to_string()), controller),
            None => (None, path),
        };
        if controller.is_empty() || method.is_empty() {
            return Err(BowError::ImproperlyConfigured(format!(
                "Handler '{text}' has an empty controller or method"
            )));
        }
        Ok(Self::ControllerMethod {
            namespace,
            controller: controller.to_string(),
            method: method.to_string(),
        })
    }

    /// Sets the namespace of a controller action. Closures are returned as is.
    #[must_use]
    pub fn in_namespace(self, ns: &str) -> Self {
        match self {
            Self::ControllerMethod {
                controller, method, ..
            } => Self::ControllerMethod {
                namespace: Some(ns.to_string()),
                controller,
                method,
            },
            closure @ Self::Closure(_) => closure,
        }
    }
}

impl From<Handler> for HandlerDescriptor {
    fn from(handler: Handler) -> Self {
        Self::Closure(handler)
    }
}

/// Parses the textual form leniently: text without `@` names a controller
/// with an empty method, which the dispatcher then reports as unresolved.
impl From<&str> for HandlerDescriptor {
    fn from(text: &str) -> Self {
        Self::action(text).unwrap_or_else(|_| Self::ControllerMethod {
            namespace: None,
            controller: text.to_string(),
            method: String::new(),
        })
    }
}

/// Controller actions by qualified name.
///
/// A qualified name joins the namespace and controller with `::`, e.g.
/// `app::UserController`.
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    actions: HashMap<(String, String), Handler>,
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .actions
            .keys()
            .map(|(c, m)| format!("{c}@{m}"))
            .collect();
        keys.sort();
        f.debug_struct("ControllerRegistry")
            .field("actions", &keys)
            .finish()
    }
}

impl ControllerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` as `method` of the controller at `controller_path`.
    pub fn register<F>(&mut self, controller_path: &str, method: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request) -> BowResult<Response> + Send + Sync + 'static,
    {
        self.actions.insert(
            (controller_path.to_string(), method.to_string()),
            Arc::new(handler),
        );
        self
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Resolves a descriptor to a callable handler.
    ///
    /// Closures resolve to themselves. A controller action without its own
    /// namespace is looked up under `default_namespace` when one is given.
    pub fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        default_namespace: Option<&str>,
    ) -> Option<Handler> {
        match descriptor {
            HandlerDescriptor::Closure(handler) => Some(Arc::clone(handler)),
            HandlerDescriptor::ControllerMethod {
                namespace,
                controller,
                method,
            } => {
                let qualified = match namespace.as_deref().or(default_namespace) {
                    Some(ns) if !ns.is_empty() => format!("{ns}::{controller}"),
                    _ => controller.clone(),
                };
                self.actions.get(&(qualified, method.clone())).cloned()
            }
        }
    }
}
