//! Reverse routing: building URLs from named routes.

use std::collections::HashMap;
use std::hash::BuildHasher;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use bow_rs_core::{BowError, BowResult};

use super::pattern::{absorbs_slash, Token};
use super::table::RouteTable;

/// Characters escaped in a parameter value placed in a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generates the URL of the route named `name`.
///
/// Each parameter takes its value from `kwargs` by name, or else from the
/// next unused entry of `args`. An optional parameter with no value is left
/// out together with the `/` in front of it.
///
/// Values are percent-encoded, and the encoded text is what gets checked
/// against the parameter's constraint: matching never decodes, so that text
/// is exactly what the route captures from the generated URL. `"a b"` comes
/// back as `"a%20b"`.
///
/// # Errors
///
/// Returns [`BowError::NotFound`] if no route has that name, a required
/// parameter has no value, or a value does not satisfy the parameter's
/// constraint.
///
/// # Examples
///
/// ```
/// use bow_rs_http::urls::reverse::reverse;
/// use bow_rs_http::urls::table::RouteTable;
/// use bow_rs_http::{HandlerDescriptor, Request, Response};
/// use std::collections::HashMap;
///
/// let mut routes = RouteTable::builder();
/// routes
///     .define("/post/:id?", HandlerDescriptor::closure(|_req: &Request| Ok(Response::ok(""))))
///     .name("post");
/// let table = routes.build().unwrap();
///
/// let mut kwargs = HashMap::new();
/// kwargs.insert("id", "5");
/// assert_eq!(reverse("post", &[], &kwargs, &table).unwrap(), "/post/5");
/// assert_eq!(reverse("post", &[], &HashMap::new(), &table).unwrap(), "/post");
/// ```
pub fn reverse<S: BuildHasher>(
    name: &str,
    args: &[&str],
    kwargs: &HashMap<&str, &str, S>,
    table: &RouteTable,
) -> BowResult<String> {
    let entry = table
        .by_name(name)
        .ok_or_else(|| BowError::NotFound(format!("Reverse for '{name}' not found")))?;
    let pattern = entry.pattern();
    let tokens = pattern.tokens();

    let mut url = String::new();
    let mut positional = args.iter();
    let mut specs = pattern.parameters().iter();

    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => url.push_str(text),
            Token::Parameter { name: param, .. } => {
                let Some(spec) = specs.next() else { break };
                let value = kwargs
                    .get(param.as_str())
                    .copied()
                    .or_else(|| positional.next().copied());

                match value {
                    Some(value) => {
                        let encoded = utf8_percent_encode(value, SEGMENT).to_string();
                        if !spec.accepts(&encoded) {
                            return Err(BowError::NotFound(format!(
                                "Value '{value}' for parameter '{param}' of route '{name}' \
                                 does not match '{}'",
                                spec.pattern()
                            )));
                        }
                        url.push_str(&encoded);
                    }
                    None if spec.is_optional() => {
                        if absorbs_slash(tokens, position) {
                            url.pop();
                        }
                    }
                    None => {
                        return Err(BowError::NotFound(format!(
                            "No value provided for parameter '{param}' of route '{name}'"
                        )));
                    }
                }
            }
        }
    }

    if url.is_empty() {
        url.push('/');
    }
    Ok(url)
}

impl RouteTable {
    /// Generates the URL of the route named `name` from `(parameter, value)`
    /// pairs. See [`reverse`].
    ///
    /// # Errors
    ///
    /// Same as [`reverse`].
    pub fn url_for(&self, name: &str, parameters: &[(&str, &str)]) -> BowResult<String> {
        let kwargs: HashMap<&str, &str> = parameters.iter().copied().collect();
        reverse(name, &[], &kwargs, self)
    }
}
