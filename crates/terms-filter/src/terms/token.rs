//! Token stream over a structured filter document.
//!
//! The collector never looks at JSON directly. It reads a flat sequence of
//! [`Token`]s, the same shape a streaming document parser would produce, so
//! any source that can emit these events can feed the compiler.

use std::fmt;

use serde_json::Value;

use super::error::{FilterError, FilterResult};

/// A scalar value in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// A string value.
    String(String),
    /// A number, kept in its textual form.
    Number(String),
    /// A boolean value.
    Bool(bool),
    /// An explicit null.
    Null,
}

impl Scalar {
    /// Returns the text form of the value, or `None` for null.
    pub fn text(&self) -> Option<String> {
        match self {
            Scalar::String(s) => Some(s.clone()),
            Scalar::Number(n) => Some(n.clone()),
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Null => None,
        }
    }

    /// Returns true if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

/// A single structural event in a filter document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening `{`.
    StartObject,
    /// Closing `}`.
    EndObject,
    /// Opening `[`.
    StartArray,
    /// Closing `]`.
    EndArray,
    /// An object key.
    FieldName(String),
    /// A scalar value.
    Value(Scalar),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartObject => write!(f, "{{"),
            Token::EndObject => write!(f, "}}"),
            Token::StartArray => write!(f, "["),
            Token::EndArray => write!(f, "]"),
            Token::FieldName(name) => write!(f, "field [{}]", name),
            Token::Value(Scalar::Null) => write!(f, "null"),
            Token::Value(v) => write!(f, "value [{}]", v.text().unwrap_or_default()),
        }
    }
}

/// A source of tokens.
///
/// Any iterator of [`Token`]s is a token stream.
pub trait TokenStream {
    /// Returns the next token, or `None` when the stream is exhausted.
    fn next_token(&mut self) -> Option<Token>;
}

impl<I> TokenStream for I
where
    I: Iterator<Item = Token>,
{
    fn next_token(&mut self) -> Option<Token> {
        self.next()
    }
}

/// Tokens for the body of a JSON filter object.
///
/// The stream is positioned just inside the object: it yields the members'
/// tokens followed by the closing [`Token::EndObject`], without the opening
/// [`Token::StartObject`].
#[derive(Debug, Clone)]
pub struct JsonTokens {
    tokens: std::vec::IntoIter<Token>,
}

impl JsonTokens {
    /// Creates a token stream over the members of a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MalformedFilter` if `body` is not an object.
    pub fn body(body: &Value) -> FilterResult<Self> {
        let Value::Object(_) = body else {
            return Err(FilterError::malformed(format!(
                "filter body must be an object, got {}",
                kind_of(body)
            )));
        };

        let mut tokens = Vec::new();
        push_value(body, &mut tokens);
        // Drop the leading StartObject; the stream starts inside the body.
        tokens.remove(0);

        Ok(Self {
            tokens: tokens.into_iter(),
        })
    }

    /// Parses `input` as JSON and creates a body token stream from it.
    pub fn parse_body(input: &str) -> FilterResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| FilterError::malformed(format!("invalid JSON: {}", e)))?;
        Self::body(&value)
    }
}

impl Iterator for JsonTokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.tokens.next()
    }
}

/// Returns a short name for the kind of a JSON value.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn push_value(value: &Value, out: &mut Vec<Token>) {
    match value {
        Value::Null => out.push(Token::Value(Scalar::Null)),
        Value::Bool(b) => out.push(Token::Value(Scalar::Bool(*b))),
        Value::Number(n) => out.push(Token::Value(Scalar::Number(n.to_string()))),
        Value::String(s) => out.push(Token::Value(Scalar::String(s.clone()))),
        Value::Array(items) => {
            out.push(Token::StartArray);
            for item in items {
                push_value(item, out);
            }
            out.push(Token::EndArray);
        }
        Value::Object(members) => {
            out.push(Token::StartObject);
            for (key, member) in members {
                out.push(Token::FieldName(key.clone()));
                push_value(member, out);
            }
            out.push(Token::EndObject);
        }
    }
}
