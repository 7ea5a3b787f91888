//! Route template parsing and compilation.
//!
//! A route template is a path made of literal text and parameter tokens:
//! `:name` captures a value, `:name?` captures an optional one. Templates are
//! tokenized once and compiled into a [`RoutePattern`], whose match primitive
//! is an anchored [`Regex`] built from the tokens plus a [`ConstraintMap`]
//! restricting what individual parameters may capture.
//!
//! | Template            | Matches                    |
//! |---------------------|----------------------------|
//! | `/user/:id`         | `/user/42`, `/user/me`     |
//! | `/post/:id?`        | `/post`, `/post/5`         |
//! | `/file/:name.:ext`  | `/file/report.pdf`         |
//! | `/:lang?`           | `/`, `/fr`                 |
//!
//! Unconstrained parameters capture lazily: each takes the shortest text
//! that still lets the rest of the template match. `/blog/:year/:slug?`
//! therefore splits `/blog/2024/intro` into `year` and `slug` instead of
//! letting `year` swallow both, and `/file/:name.:ext` splits
//! `/file/a.b.pdf` at the first dot (`name = "a"`, `ext = "b.pdf"`).
//! Constrain a parameter when a different split is wanted.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

use regex::Regex;

use bow_rs_core::PatternCompileError;

/// Per-parameter restrictions: parameter name to regex sub-pattern.
pub type ConstraintMap = HashMap<String, String>;

/// The sub-pattern used for parameters without a constraint: one or more
/// non-whitespace characters, lazy so a following optional parameter keeps
/// its own segment.
pub const DEFAULT_PARAMETER_PATTERN: &str = r"[^\s]+?";

/// One piece of a tokenized route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, matched verbatim.
    Literal(String),
    /// A named parameter (`:name`, or `:name?` when optional).
    Parameter {
        /// The parameter name.
        name: String,
        /// Whether the whole capture may be absent.
        optional: bool,
    },
}

/// A compiled parameter: its name, the sub-pattern it captures with, and an
/// anchored validator for that sub-pattern.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    optional: bool,
    pattern: String,
    group: String,
    validator: Regex,
}

impl ParameterSpec {
    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for `:name?` parameters.
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the sub-pattern this parameter captures with.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns `true` if `value` as a whole satisfies the sub-pattern.
    pub fn accepts(&self, value: &str) -> bool {
        self.validator.is_match(value)
    }

    pub(crate) fn group(&self) -> &str {
        &self.group
    }
}

/// An immutable, compiled route template.
///
/// Holds no per-request state: matching borrows the pattern and returns fresh
/// values, so one pattern can be shared by every worker.
#[derive(Clone)]
pub struct RoutePattern {
    template: String,
    tokens: Vec<Token>,
    parameters: Vec<ParameterSpec>,
    parameter_names: Vec<String>,
    has_optional_trailing_parameter: bool,
    segment_count: usize,
    required_segment_count: usize,
    primitive: Regex,
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("template", &self.template)
            .field("primitive", &self.primitive.as_str())
            .field("parameter_names", &self.parameter_names)
            .field(
                "has_optional_trailing_parameter",
                &self.has_optional_trailing_parameter,
            )
            .finish_non_exhaustive()
    }
}

impl RoutePattern {
    /// Compiles a template without constraints.
    pub fn new(template: &str) -> Result<Self, PatternCompileError> {
        Self::compile(template, &ConstraintMap::new())
    }

    /// Compiles a template, narrowing constrained parameters to their
    /// sub-patterns.
    ///
    /// # Errors
    ///
    /// - [`PatternCompileError::DuplicateParameter`] if a name repeats.
    /// - [`PatternCompileError::UnknownParameter`] if a constraint names a
    ///   parameter the template does not declare.
    /// - [`PatternCompileError::InvalidConstraint`] if a sub-pattern is not a
    ///   valid regex.
    /// - [`PatternCompileError::InvalidTemplate`] if the assembled primitive
    ///   does not compile.
    pub fn compile(template: &str, constraints: &ConstraintMap) -> Result<Self, PatternCompileError> {
        let template = normalize_path(template).to_string();
        let tokens = tokenize(&template);

        let mut parameter_names: Vec<String> = Vec::new();
        for token in &tokens {
            if let Token::Parameter { name, .. } = token {
                if parameter_names.contains(name) {
                    return Err(PatternCompileError::DuplicateParameter {
                        template,
                        name: name.clone(),
                    });
                }
                parameter_names.push(name.clone());
            }
        }

        let mut constrained: Vec<&String> = constraints.keys().collect();
        constrained.sort();
        if let Some(unknown) = constrained
            .into_iter()
            .find(|name| !parameter_names.contains(*name))
        {
            return Err(PatternCompileError::UnknownParameter {
                template,
                name: unknown.clone(),
            });
        }

        let mut parameters = Vec::with_capacity(parameter_names.len());
        for token in &tokens {
            if let Token::Parameter { name, optional } = token {
                let pattern = constraints
                    .get(name)
                    .map_or(DEFAULT_PARAMETER_PATTERN, String::as_str);
                let validator = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    PatternCompileError::InvalidConstraint {
                        name: name.clone(),
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                parameters.push(ParameterSpec {
                    name: name.clone(),
                    optional: *optional,
                    pattern: pattern.to_string(),
                    group: format!("__bow{}", parameters.len()),
                    validator,
                });
            }
        }

        let source = primitive_source(&tokens, &parameters);
        let primitive = Regex::new(&source).map_err(|e| PatternCompileError::InvalidTemplate {
            template: template.clone(),
            reason: e.to_string(),
        })?;

        let has_optional_trailing_parameter = parameters.last().is_some_and(|p| p.optional);
        let segment_count = template.split('/').count();
        let required_segment_count = required_template(&tokens).split('/').count();

        Ok(Self {
            template,
            tokens,
            parameters,
            parameter_names,
            has_optional_trailing_parameter,
            segment_count,
            required_segment_count,
            primitive,
        })
    }

    /// Returns the normalized template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the template tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the compiled parameters in template order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Returns the parameter names in template order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Returns `true` if the last parameter of the template is optional.
    pub const fn has_optional_trailing_parameter(&self) -> bool {
        self.has_optional_trailing_parameter
    }

    /// Number of `/`-separated pieces in the template.
    pub const fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Number of `/`-separated pieces once every `/:name?` is left out.
    pub const fn required_segment_count(&self) -> usize {
        self.required_segment_count
    }

    /// Returns the anchored match primitive.
    pub const fn primitive(&self) -> &Regex {
        &self.primitive
    }
}

/// Strips one trailing `/`, except from the root path. An empty path is the root.
///
/// Only one slash goes: `/post//` keeps an empty last segment and does not
/// match `/post/:id?`.
pub fn normalize_path(path: &str) -> &str {
    if path.is_empty() || path == "/" {
        return "/";
    }
    path.strip_suffix('/').unwrap_or(path)
}

/// Splits a template into literal and parameter tokens.
///
/// A parameter is `:` followed by one or more ASCII letters, digits or `_`;
/// a `?` right after the name makes it optional. A `:` not followed by a
/// name character stays literal.
pub fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' {
            literal.push(c);
            continue;
        }

        let mut name = String::new();
        while let Some(next) = chars.next_if(|&next| is_name_char(next)) {
            name.push(next);
        }
        if name.is_empty() {
            literal.push(':');
            continue;
        }

        let optional = chars.next_if_eq(&'?').is_some();
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(Token::Parameter { name, optional });
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// An optional parameter directly after a `/` takes that slash into its
/// optional group, so `/post/:id?` matches both `/post` and `/post/5`.
pub(crate) fn absorbs_slash(tokens: &[Token], position: usize) -> bool {
    position > 0
        && matches!(tokens.get(position), Some(Token::Parameter { optional: true, .. }))
        && matches!(&tokens[position - 1], Token::Literal(text) if text.ends_with('/'))
}

fn primitive_source(tokens: &[Token], parameters: &[ParameterSpec]) -> String {
    let mut source = String::from("^");
    let mut specs = parameters.iter();

    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => {
                if absorbs_slash(tokens, position + 1) {
                    let kept = &text[..text.len() - 1];
                    if position == 0 && kept.is_empty() {
                        // Template reduces to the root: `/` alone must match.
                        source.push_str("/?");
                    } else {
                        source.push_str(&regex::escape(kept));
                    }
                } else {
                    source.push_str(&regex::escape(text));
                }
            }
            Token::Parameter { .. } => {
                let Some(spec) = specs.next() else { break };
                if spec.optional {
                    let slash = if absorbs_slash(tokens, position) { "/" } else { "" };
                    write!(source, "(?:{slash}(?P<{}>(?:{})))?", spec.group, spec.pattern).ok();
                } else {
                    write!(source, "(?P<{}>(?:{}))", spec.group, spec.pattern).ok();
                }
            }
        }
    }

    source.push('$');
    source
}

fn required_template(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Parameter { optional: true, .. } => {
                if absorbs_slash(tokens, position) {
                    out.pop();
                }
            }
            Token::Parameter { name, .. } => {
                out.push(':');
                out.push_str(name);
            }
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
