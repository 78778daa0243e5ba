//! Declared fetch parameters and the binder that turns raw query
//! strings into typed arguments.
//!
//! Every calendar declares its parameters as a static slice of
//! [`ParamSpec`]s. The binder derives a [`ParamSchema`] from that
//! declaration, checks a request's raw `name -> text` mapping against
//! it and produces the [`Params`] handed to `fetch_events`. Because the
//! schema is derived from the declaration alone, new calendars show
//! up as typed HTTP parameters without any routing code of their own.
use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use super::{Calendar, CalendarError};
use crate::calendar::Event;
use crate::error::FeedError;

/// Raw query parameters as received from the caller.
pub type RawParams = HashMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    /// Coerce raw text into a value of this kind.
    pub fn coerce(&self, raw: &str) -> Option<ParamValue> {
        match self {
            Self::String => Some(ParamValue::String(raw.to_string())),
            Self::Integer => raw.parse::<i64>().ok().map(ParamValue::Integer),
            Self::Boolean => parse_bool(raw).map(ParamValue::Boolean),
        }
    }
}

/// Accepts the usual query string spellings of a boolean.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Default value of an optional parameter, usable in `const` context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    String(&'static str),
    Integer(i64),
    Boolean(bool),
}

impl ParamDefault {
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::String(_) => ParamKind::String,
            Self::Integer(_) => ParamKind::Integer,
            Self::Boolean(_) => ParamKind::Boolean,
        }
    }

    fn value(&self) -> ParamValue {
        match self {
            Self::String(s) => ParamValue::String(s.to_string()),
            Self::Integer(i) => ParamValue::Integer(*i),
            Self::Boolean(b) => ParamValue::Boolean(*b),
        }
    }
}

/// One declared parameter of a calendar's fetch operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Option<ParamDefault>,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            description: "",
        }
    }

    pub const fn optional(name: &'static str, default: ParamDefault) -> Self {
        Self {
            name,
            kind: default.kind(),
            default: Some(default),
            description: "",
        }
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

impl Serialize for ParamSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ParamSpec", 5)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("required", &self.is_required())?;
        match &self.default {
            Some(default) => state.serialize_field("default", default)?,
            None => state.skip_field("default")?,
        }
        if self.description.is_empty() {
            state.skip_field("description")?;
        } else {
            state.serialize_field("description", self.description)?;
        }
        state.end()
    }
}

/// The externally visible parameter contract of a calendar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParamSchema(Vec<ParamSpec>);

impl ParamSchema {
    /// Derive the schema from a calendar's declared parameters.
    pub fn derive<C: Calendar + ?Sized>(calendar: &C) -> Self {
        Self::from_specs(calendar.params())
    }

    pub fn from_specs(specs: &[ParamSpec]) -> Self {
        Self(specs.to_vec())
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.0.iter().find(|spec| spec.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names declared more than once.
    pub fn duplicates(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .map(|spec| spec.name)
            .duplicates()
            .collect()
    }
}

/// A bound, type-coerced parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

/// The exact argument set a calendar declared, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Result<&str, CalendarError> {
        match self.0.get(name) {
            Some(ParamValue::String(s)) => Ok(s),
            _ => Err(undeclared(name, ParamKind::String)),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64, CalendarError> {
        match self.0.get(name) {
            Some(ParamValue::Integer(i)) => Ok(*i),
            _ => Err(undeclared(name, ParamKind::Integer)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, CalendarError> {
        match self.0.get(name) {
            Some(ParamValue::Boolean(b)) => Ok(*b),
            _ => Err(undeclared(name, ParamKind::Boolean)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn undeclared(name: &str, kind: ParamKind) -> CalendarError {
    CalendarError::InvalidParameters(format!(
        "parameter `{}` of type {} was not bound",
        name,
        kind.as_str()
    ))
}

/// Validate and coerce `raw` against `schema`.
///
/// Unknown names, missing required parameters and values that cannot
/// be coerced are all reported together in one `InvalidParameters`.
pub fn bind(schema: &ParamSchema, raw: &RawParams) -> Result<Params, FeedError> {
    let mut problems = Vec::new();

    let unknown = raw
        .keys()
        .filter(|name| schema.get(name).is_none())
        .sorted()
        .collect::<Vec<_>>();
    for name in unknown {
        problems.push(format!("unknown parameter `{}`", name));
    }

    let mut bound = IndexMap::new();
    for spec in schema.specs() {
        match (raw.get(spec.name), &spec.default) {
            (Some(text), _) => match spec.kind.coerce(text) {
                Some(value) => {
                    bound.insert(spec.name.to_string(), value);
                }
                None => problems.push(format!(
                    "parameter `{}` expects {}, got `{}`",
                    spec.name,
                    spec.kind.as_str(),
                    text
                )),
            },
            (None, Some(default)) => {
                bound.insert(spec.name.to_string(), default.value());
            }
            (None, None) => {
                problems.push(format!("missing required parameter `{}`", spec.name))
            }
        }
    }

    if problems.is_empty() {
        Ok(Params(bound))
    } else {
        let message = problems.join("; ");
        tracing::debug!("Rejected parameters: {}", message);
        Err(FeedError::InvalidParameters(message))
    }
}

/// Bind `raw` against the calendar's own schema and call it.
pub async fn invoke(calendar: &dyn Calendar, raw: &RawParams) -> Result<Vec<Event>, FeedError> {
    let params = bind(&ParamSchema::derive(calendar), raw)?;
    Ok(calendar.fetch_events(&params).await?)
}
