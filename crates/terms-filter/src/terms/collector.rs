//! Collects a [`FilterRequest`] from the tokens of a terms filter body.

use super::error::{FilterError, FilterResult};
use super::request::{CacheKey, CacheOverride, FilterRequest, DEFAULT_EXECUTION};
use super::token::{Scalar, Token, TokenStream};

/// Collector position within the filter body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Reading top-level members.
    Start,
    /// Reading the values of the terms array.
    InArray,
    /// The closing `}` has been read.
    Done,
}

/// State machine that reads a terms filter body.
///
/// The body has one array-valued key, whose name becomes the field name and
/// whose values become the terms, plus optional scalar options:
///
/// ```text
/// body    ::= "{" member* "}"
/// member  ::= FIELD "[" scalar* "]"
///           | "execution" scalar
///           | "_name" scalar
///           | "_cache" scalar
///           | ("_cache_key" | "_cacheKey") scalar
/// ```
///
/// The stream must be positioned just inside the opening `{`.
///
/// # Example
///
/// ```
/// use terms_filter_rs::{ArgumentCollector, JsonTokens};
///
/// let mut tokens = JsonTokens::parse_body(r#"{"status": ["active"], "execution": "bool"}"#).unwrap();
/// let request = ArgumentCollector::collect(&mut tokens).unwrap();
/// assert_eq!(request.field_name, "status");
/// assert_eq!(request.execution, "bool");
/// ```
pub struct ArgumentCollector {
    state: State,
    current_key: Option<String>,
    field_name: Option<String>,
    terms: Vec<String>,
    execution: String,
    filter_name: Option<String>,
    cache: CacheOverride,
    cache_key: Option<CacheKey>,
}

impl ArgumentCollector {
    /// Reads tokens up to and including the body's closing `}`.
    ///
    /// # Errors
    ///
    /// - `FilterError::NullTermValue` if the terms array holds a null.
    /// - `FilterError::UnsupportedOption` for an unknown scalar key.
    /// - `FilterError::DuplicateFieldName` for a second terms array.
    /// - `FilterError::InvalidCacheFlag` if `_cache` is not a boolean.
    /// - `FilterError::MissingFieldName` if there is no terms array.
    /// - `FilterError::UnexpectedToken` / `UnexpectedEndOfInput` for a
    ///   structurally broken body.
    pub fn collect<T>(tokens: &mut T) -> FilterResult<FilterRequest>
    where
        T: TokenStream + ?Sized,
    {
        let mut collector = Self {
            state: State::Start,
            current_key: None,
            field_name: None,
            terms: Vec::new(),
            execution: DEFAULT_EXECUTION.to_string(),
            filter_name: None,
            cache: CacheOverride::Unset,
            cache_key: None,
        };

        while collector.state != State::Done {
            let token = tokens
                .next_token()
                .ok_or(FilterError::UnexpectedEndOfInput)?;
            collector.step(token)?;
        }

        collector.finish()
    }

    fn step(&mut self, token: Token) -> FilterResult<()> {
        match self.state {
            State::Start => self.step_member(token),
            State::InArray => self.step_array(token),
            State::Done => Err(FilterError::unexpected_token(token.to_string())),
        }
    }

    fn step_member(&mut self, token: Token) -> FilterResult<()> {
        match token {
            Token::EndObject => {
                if let Some(key) = self.current_key.take() {
                    return Err(FilterError::unexpected_token(format!(
                        "}} after field [{}]",
                        key
                    )));
                }
                self.state = State::Done;
            }
            Token::FieldName(name) => {
                if let Some(key) = self.current_key.replace(name) {
                    return Err(FilterError::unexpected_token(format!(
                        "field name after field [{}]",
                        key
                    )));
                }
            }
            Token::StartArray => {
                let key = self.take_key("[")?;
                if let Some(first) = self.field_name.take() {
                    return Err(FilterError::DuplicateFieldName { first, second: key });
                }
                self.field_name = Some(key);
                self.state = State::InArray;
            }
            Token::Value(value) => {
                let key = self.take_key("value")?;
                self.apply_option(key, value)?;
            }
            Token::StartObject => {
                let key = self.take_key("{")?;
                return Err(FilterError::unexpected_token(format!(
                    "object value for [{}]",
                    key
                )));
            }
            Token::EndArray => return Err(FilterError::unexpected_token("]")),
        }
        Ok(())
    }

    fn step_array(&mut self, token: Token) -> FilterResult<()> {
        match token {
            Token::EndArray => self.state = State::Start,
            Token::Value(value) => match value.text() {
                Some(text) => self.terms.push(text),
                None => {
                    let field = self.field_name.clone().unwrap_or_default();
                    return Err(FilterError::null_term(field));
                }
            },
            other => {
                return Err(FilterError::unexpected_token(format!(
                    "{} inside terms array",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Takes the pending key for a value token.
    fn take_key(&mut self, what: &str) -> FilterResult<String> {
        self.current_key
            .take()
            .ok_or_else(|| FilterError::unexpected_token(format!("{} without a field name", what)))
    }

    fn apply_option(&mut self, key: String, value: Scalar) -> FilterResult<()> {
        match key.as_str() {
            // Kept as text; the strategy lookup rejects unknown modes.
            "execution" => {
                self.execution = value.text().unwrap_or_else(|| "null".to_string());
            }
            "_name" => self.filter_name = value.text(),
            "_cache" => self.cache = parse_cache_flag(&value)?,
            "_cache_key" | "_cacheKey" => self.cache_key = value.text().map(CacheKey::new),
            _ => return Err(FilterError::unsupported_option(key)),
        }
        Ok(())
    }

    fn finish(self) -> FilterResult<FilterRequest> {
        let field_name = self.field_name.ok_or(FilterError::MissingFieldName)?;

        tracing::trace!(
            field = %field_name,
            terms = self.terms.len(),
            execution = %self.execution,
            "collected terms filter"
        );

        Ok(FilterRequest {
            field_name,
            terms: self.terms,
            execution: self.execution,
            filter_name: self.filter_name,
            cache: self.cache,
            cache_key: self.cache_key,
        })
    }
}

/// Reads a `_cache` value. Null leaves the override unset.
fn parse_cache_flag(value: &Scalar) -> FilterResult<CacheOverride> {
    match value {
        Scalar::Null => Ok(CacheOverride::Unset),
        Scalar::Bool(b) => Ok(CacheOverride::from(*b)),
        Scalar::String(text) | Scalar::Number(text) => match text.to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(CacheOverride::ForceOn),
            "false" | "off" | "no" | "0" => Ok(CacheOverride::ForceOff),
            _ => Err(FilterError::InvalidCacheFlag {
                value: text.clone(),
            }),
        },
    }
}
