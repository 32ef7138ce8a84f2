//! The three parameter kinds and the tagged `Param` enum that stores them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parameter::{is_truthy, Parameter, ParameterRecord, ValueOrigin};
use crate::source::ValueSource;

/// Kind tag used for dispatch in the matching loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Flag,
    Option,
    Argument,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Option => "option",
            Self::Argument => "argument",
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_int(value: String) -> Result<i64> {
    match value.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(source) => Err(Error::InvalidInt { value, source }),
    }
}

fn parse_uint(value: String) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) => Ok(n),
        Err(source) => Err(Error::InvalidUint { value, source }),
    }
}

fn parse_number(value: String) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(n) => Ok(n),
        Err(source) => Err(Error::InvalidNumber { value, source }),
    }
}

/// Value resolution shared by options and arguments.
fn resolve_value(record: &ParameterRecord, missing: Error) -> Result<String> {
    if record.value_set {
        return record.value.clone().ok_or(Error::OptionValueMissing);
    }
    record
        .resolve_default()
        .map(|(v, _)| v.to_string())
        .ok_or(missing)
}

fn not_a_flag(record: &ParameterRecord, kind: ParameterKind) -> ! {
    panic!(
        "set_flag called on {kind} parameter '{}'; only flags can be marked used",
        record.key
    )
}

/// Boolean presence parameter.
///
/// Only the static default applies; environment and config sources are
/// ignored for flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flag {
    record: ParameterRecord,
    default_value: bool,
    flag_value: bool,
}

impl Flag {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            record: ParameterRecord::new(key),
            ..Default::default()
        }
    }

    pub fn default_flag(&self) -> bool {
        self.default_value
    }
}

impl Parameter for Flag {
    fn kind(&self) -> ParameterKind {
        ParameterKind::Flag
    }

    fn record(&self) -> &ParameterRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ParameterRecord {
        &mut self.record
    }

    fn get_value(&self) -> Result<String> {
        Ok(if self.flag_value { "true" } else { "false" }.to_string())
    }

    fn get_flag(&self) -> bool {
        self.flag_value
    }

    fn get_int(&self) -> Result<i64> {
        Ok(i64::from(self.flag_value))
    }

    fn get_uint(&self) -> Result<u64> {
        Ok(u64::from(self.flag_value))
    }

    fn get_number(&self) -> Result<f64> {
        Ok(if self.flag_value { 1.0 } else { 0.0 })
    }

    fn set_default(&mut self, value: &str) {
        self.default_value = is_truthy(value);
        self.record.default_value = Some(value.to_string());
        if !self.record.value_set {
            self.flag_value = self.default_value;
        }
    }

    fn set_flag(&mut self) {
        self.flag_value = true;
        self.record.store(Some("true".to_string()));
        tracing::debug!(key = %self.record.key, "flag set");
    }

    fn set_value(&mut self, value: &str) {
        self.flag_value = is_truthy(value);
        self.record.store(Some(value.to_string()));
        tracing::debug!(key = %self.record.key, value, flag = self.flag_value, "flag value set");
    }

    fn reset(&mut self) {
        self.record.clear_match();
        self.flag_value = self.default_value;
    }

    fn value_origin(&self) -> Option<ValueOrigin> {
        if self.record.value_set {
            Some(ValueOrigin::CommandLine)
        } else {
            Some(ValueOrigin::Default)
        }
    }

    fn load_defaults(&mut self, _env: &dyn ValueSource, _config: &dyn ValueSource) {}
}

/// Named parameter carrying a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Opt {
    record: ParameterRecord,
    value_optional: bool,
}

impl Opt {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            record: ParameterRecord::new(key),
            value_optional: false,
        }
    }

    /// Whether the option needs a value whenever it is used (the default).
    ///
    /// An option whose value is optional takes a value only when one is
    /// attached (`--color=always`); a bare `--color` leaves the next token
    /// alone and reads back through the default chain.
    pub fn set_value_required(&mut self, required: bool) -> &mut Self {
        self.value_optional = !required;
        self
    }

    pub fn is_value_required(&self) -> bool {
        !self.value_optional
    }

    fn given_bare(&self) -> bool {
        self.record.value_set && self.record.value.is_none()
    }

    /// Record that the option appeared without a value.
    pub(crate) fn mark_without_value(&mut self) {
        self.record.store(None);
        tracing::debug!(key = %self.record.key, "option given without a value");
    }
}

impl Parameter for Opt {
    fn kind(&self) -> ParameterKind {
        ParameterKind::Option
    }

    fn record(&self) -> &ParameterRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ParameterRecord {
        &mut self.record
    }

    fn get_value(&self) -> Result<String> {
        if self.value_optional && self.given_bare() {
            return Ok(self
                .record
                .resolve_default()
                .map(|(v, _)| v.to_string())
                .unwrap_or_default());
        }
        resolve_value(&self.record, Error::Missing)
    }

    fn get_flag(&self) -> bool {
        self.get_value().is_ok_and(|v| is_truthy(&v))
    }

    fn get_int(&self) -> Result<i64> {
        parse_int(self.get_value()?)
    }

    fn get_uint(&self) -> Result<u64> {
        parse_uint(self.get_value()?)
    }

    fn get_number(&self) -> Result<f64> {
        parse_number(self.get_value()?)
    }

    fn set_default(&mut self, value: &str) {
        self.record.default_value = Some(value.to_string());
    }

    fn set_flag(&mut self) {
        not_a_flag(&self.record, ParameterKind::Option)
    }

    fn set_value(&mut self, value: &str) {
        self.record.store(Some(value.to_string()));
        tracing::debug!(key = %self.record.key, value, "option value set");
    }

    fn value_origin(&self) -> Option<ValueOrigin> {
        if self.value_optional && self.given_bare() {
            return Some(
                self.record
                    .resolve_default()
                    .map_or(ValueOrigin::CommandLine, |(_, origin)| origin),
            );
        }
        if self.record.value_set {
            return self.record.value.as_ref().map(|_| ValueOrigin::CommandLine);
        }
        self.record.resolve_default().map(|(_, origin)| origin)
    }
}

/// Positional parameter; filled by order, never by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arg {
    record: ParameterRecord,
    position: Option<usize>,
}

impl Arg {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            record: ParameterRecord::new(key),
            position: None,
        }
    }

    /// Pin the argument to an argv position (1 is the first token after the
    /// program name). `None` lets it take leftovers in declaration order.
    pub fn set_position(&mut self, position: Option<usize>) -> &mut Self {
        self.position = position.filter(|&p| p > 0);
        self
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl Parameter for Arg {
    fn kind(&self) -> ParameterKind {
        ParameterKind::Argument
    }

    fn record(&self) -> &ParameterRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ParameterRecord {
        &mut self.record
    }

    fn get_value(&self) -> Result<String> {
        resolve_value(&self.record, Error::ArgumentMissing)
    }

    fn get_flag(&self) -> bool {
        self.get_value().is_ok_and(|v| is_truthy(&v))
    }

    fn get_int(&self) -> Result<i64> {
        parse_int(self.get_value()?)
    }

    fn get_uint(&self) -> Result<u64> {
        parse_uint(self.get_value()?)
    }

    fn get_number(&self) -> Result<f64> {
        parse_number(self.get_value()?)
    }

    // Arguments are positional; declared names only feed help output.
    fn get_name(&self) -> &[String] {
        &[]
    }

    fn set_default(&mut self, value: &str) {
        self.record.default_value = Some(value.to_string());
    }

    fn set_flag(&mut self) {
        not_a_flag(&self.record, ParameterKind::Argument)
    }

    fn set_value(&mut self, value: &str) {
        self.record.store(Some(value.to_string()));
        tracing::debug!(key = %self.record.key, value, "argument value set");
    }
}

/// A declared parameter of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Flag(Flag),
    Option(Opt),
    Argument(Arg),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Param::Flag($p) => $body,
            Param::Option($p) => $body,
            Param::Argument($p) => $body,
        }
    };
}

impl Param {
    pub fn as_flag(&self) -> Option<&Flag> {
        match self {
            Self::Flag(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&Opt> {
        match self {
            Self::Option(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_argument(&self) -> Option<&Arg> {
        match self {
            Self::Argument(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_option_mut(&mut self) -> Option<&mut Opt> {
        match self {
            Self::Option(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_argument_mut(&mut self) -> Option<&mut Arg> {
        match self {
            Self::Argument(a) => Some(a),
            _ => None,
        }
    }
}

impl From<Flag> for Param {
    fn from(f: Flag) -> Self {
        Self::Flag(f)
    }
}

impl From<Opt> for Param {
    fn from(o: Opt) -> Self {
        Self::Option(o)
    }
}

impl From<Arg> for Param {
    fn from(a: Arg) -> Self {
        Self::Argument(a)
    }
}

impl Parameter for Param {
    fn kind(&self) -> ParameterKind {
        dispatch!(self, p => p.kind())
    }

    fn record(&self) -> &ParameterRecord {
        dispatch!(self, p => p.record())
    }

    fn record_mut(&mut self) -> &mut ParameterRecord {
        dispatch!(self, p => p.record_mut())
    }

    fn get_value(&self) -> Result<String> {
        dispatch!(self, p => p.get_value())
    }

    fn get_flag(&self) -> bool {
        dispatch!(self, p => p.get_flag())
    }

    fn get_int(&self) -> Result<i64> {
        dispatch!(self, p => p.get_int())
    }

    fn get_uint(&self) -> Result<u64> {
        dispatch!(self, p => p.get_uint())
    }

    fn get_number(&self) -> Result<f64> {
        dispatch!(self, p => p.get_number())
    }

    fn set_default(&mut self, value: &str) {
        dispatch!(self, p => p.set_default(value))
    }

    fn set_flag(&mut self) {
        dispatch!(self, p => p.set_flag())
    }

    fn set_value(&mut self, value: &str) {
        dispatch!(self, p => p.set_value(value))
    }

    fn get_name(&self) -> &[String] {
        dispatch!(self, p => p.get_name())
    }

    fn reset(&mut self) {
        dispatch!(self, p => p.reset())
    }

    fn value_origin(&self) -> Option<ValueOrigin> {
        dispatch!(self, p => p.value_origin())
    }

    fn load_defaults(&mut self, env: &dyn ValueSource, config: &dyn ValueSource) {
        dispatch!(self, p => p.load_defaults(env, config))
    }
}
