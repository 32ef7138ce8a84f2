//! The parameter record shared by every kind, and the capability trait.

use crate::error::{Error, Result};
use crate::kinds::ParameterKind;
use crate::source::ValueSource;

pub const TRUTHY_ONE: &str = "1";
pub const TRUTHY_TRUE: &str = "true";
pub const TRUTHY_YES: &str = "yes";

/// The single boolean-coercion rule: case-insensitive `1`, `true` or `yes`.
///
/// Everything else, the empty string included, is false.
pub fn is_truthy(s: &str) -> bool {
    [TRUTHY_ONE, TRUTHY_TRUE, TRUTHY_YES]
        .iter()
        .any(|t| s.eq_ignore_ascii_case(t))
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOrigin {
    CommandLine,
    Config,
    Environment,
    Default,
}

impl ValueOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommandLine => "command-line",
            Self::Config => "config",
            Self::Environment => "environment",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named external default (environment variable or config key) and the
/// value loaded for it, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultSource {
    pub name: String,
    pub value: Option<String>,
}

impl DefaultSource {
    fn new(name: String) -> Self {
        Self { name, value: None }
    }

    fn load(&mut self, source: &dyn ValueSource) {
        // An empty value counts as unset.
        self.value = source.lookup(&self.name).filter(|v| !v.is_empty());
    }
}

/// State carried by every parameter kind.
///
/// Owned by exactly one `Flag`, `Opt` or `Arg`; it has no behavior of its own
/// beyond default-chain resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterRecord {
    pub(crate) key: String,
    pub(crate) names: Vec<String>,
    pub(crate) prefixes: Vec<String>,
    pub(crate) suffixes: Vec<String>,
    pub(crate) help: String,
    pub(crate) value_name: Option<String>,
    pub(crate) required: bool,
    pub(crate) value: Option<String>,
    pub(crate) value_set: bool,
    pub(crate) index: Option<usize>,
    pub(crate) default_value: Option<String>,
    pub(crate) env_default: Option<DefaultSource>,
    pub(crate) config_default: Option<DefaultSource>,
    pub(crate) config_preferred: bool,
}

impl ParameterRecord {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn value_name(&self) -> Option<&str> {
        self.value_name.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the command line set this parameter.
    pub fn is_set(&self) -> bool {
        self.value_set
    }

    /// Argv position of the token that set the value.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn env_default(&self) -> Option<&DefaultSource> {
        self.env_default.as_ref()
    }

    pub fn config_default(&self) -> Option<&DefaultSource> {
        self.config_default.as_ref()
    }

    pub fn config_preferred(&self) -> bool {
        self.config_preferred
    }

    /// Resolve the default chain: preferred external source, the other
    /// external source, then the static default.
    pub(crate) fn resolve_default(&self) -> Option<(&str, ValueOrigin)> {
        let config = self
            .config_default
            .as_ref()
            .and_then(|d| d.value.as_deref())
            .map(|v| (v, ValueOrigin::Config));
        let env = self
            .env_default
            .as_ref()
            .and_then(|d| d.value.as_deref())
            .map(|v| (v, ValueOrigin::Environment));

        let (first, second) = if self.config_preferred {
            (config, env)
        } else {
            (env, config)
        };

        first.or(second).or_else(|| {
            self.default_value
                .as_deref()
                .map(|v| (v, ValueOrigin::Default))
        })
    }

    pub(crate) fn store(&mut self, value: Option<String>) {
        self.value = value;
        self.value_set = true;
    }

    pub(crate) fn clear_match(&mut self) {
        self.value = None;
        self.value_set = false;
        self.index = None;
    }
}

pub(crate) fn validate_names(names: &[String]) -> Result<()> {
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(Error::InvalidName);
    }
    Ok(())
}

pub(crate) fn union_into(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// The capability set every parameter kind implements.
///
/// Kind-specific behavior (coercion, default semantics, `set_flag`) is
/// implemented per kind; everything that only touches the shared record is
/// provided here.
pub trait Parameter {
    fn kind(&self) -> ParameterKind;
    fn record(&self) -> &ParameterRecord;
    fn record_mut(&mut self) -> &mut ParameterRecord;

    /// The resolved value as a string.
    fn get_value(&self) -> Result<String>;
    fn get_flag(&self) -> bool;
    fn get_int(&self) -> Result<i64>;
    fn get_uint(&self) -> Result<u64>;
    fn get_number(&self) -> Result<f64>;

    fn set_default(&mut self, value: &str);

    /// Mark a flag as used.
    ///
    /// # Panics
    ///
    /// On any kind other than a flag. Callers must check the kind first.
    fn set_flag(&mut self);

    fn set_value(&mut self, value: &str);

    /// Names usable on the command line.
    fn get_name(&self) -> &[String] {
        &self.record().names
    }

    /// Forget everything the last match pass recorded.
    fn reset(&mut self) {
        self.record_mut().clear_match();
    }

    fn value_origin(&self) -> Option<ValueOrigin> {
        let record = self.record();
        if record.value_set {
            return record.value.as_ref().map(|_| ValueOrigin::CommandLine);
        }
        record.resolve_default().map(|(_, origin)| origin)
    }

    fn key(&self) -> &str {
        &self.record().key
    }

    fn set_key(&mut self, key: impl Into<String>) -> Result<()>
    where
        Self: Sized,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        self.record_mut().key = key;
        Ok(())
    }

    /// Replace the accepted names. Fails without touching the current list if
    /// any entry is blank.
    fn set_name<I, S>(&mut self, names: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        validate_names(&names)?;
        self.record_mut().names = names;
        Ok(())
    }

    fn get_prefix(&self) -> &[String] {
        &self.record().prefixes
    }

    /// Union `list` into the prefixes when `append` is set, otherwise replace.
    fn set_prefix<I, S>(&mut self, list: I, append: bool)
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = list.into_iter().map(Into::into).collect();
        let record = self.record_mut();
        if append {
            union_into(&mut record.prefixes, list);
        } else {
            record.prefixes = list;
        }
    }

    fn get_suffix(&self) -> &[String] {
        &self.record().suffixes
    }

    fn set_suffix<I, S>(&mut self, list: I, append: bool)
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = list.into_iter().map(Into::into).collect();
        let record = self.record_mut();
        if append {
            union_into(&mut record.suffixes, list);
        } else {
            record.suffixes = list;
        }
    }

    fn help(&self) -> &str {
        &self.record().help
    }

    fn set_help(&mut self, help: impl Into<String>)
    where
        Self: Sized,
    {
        self.record_mut().help = help.into();
    }

    fn set_value_name(&mut self, name: impl Into<String>)
    where
        Self: Sized,
    {
        self.record_mut().value_name = Some(name.into());
    }

    fn set_required(&mut self, required: bool) {
        self.record_mut().required = required;
    }

    fn is_required(&self) -> bool {
        self.record().required
    }

    fn is_set(&self) -> bool {
        self.record().value_set
    }

    /// Name an environment variable to use as a default source.
    fn set_env_default(&mut self, name: impl Into<String>) -> Result<()>
    where
        Self: Sized,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyEnvDefaultName);
        }
        self.record_mut().env_default = Some(DefaultSource::new(name));
        Ok(())
    }

    /// Name a config key to use as a default source.
    fn set_config_default(&mut self, name: impl Into<String>) -> Result<()>
    where
        Self: Sized,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyConfigDefaultName);
        }
        self.record_mut().config_default = Some(DefaultSource::new(name));
        Ok(())
    }

    /// Prefer the config default over the environment default when both exist.
    fn set_config_preferred(&mut self, preferred: bool) {
        self.record_mut().config_preferred = preferred;
    }

    /// Look up the registered default-source names.
    fn load_defaults(&mut self, env: &dyn ValueSource, config: &dyn ValueSource) {
        let record = self.record_mut();
        if let Some(d) = record.env_default.as_mut() {
            d.load(env);
        }
        if let Some(d) = record.config_default.as_mut() {
            d.load(config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_accepts_exactly_three_literals() {
        for s in ["1", "true", "TRUE", "Yes", "yEs"] {
            assert!(is_truthy(s), "{s:?} should be truthy");
        }
        for s in ["", "0", "no", "false", "y", "on", " true", "2"] {
            assert!(!is_truthy(s), "{s:?} should be falsy");
        }
    }

    #[test]
    fn resolve_default_honors_preference() {
        let mut record = ParameterRecord::new("out");
        record.default_value = Some("static".to_string());
        assert_eq!(
            record.resolve_default(),
            Some(("static", ValueOrigin::Default))
        );

        record.config_default = Some(DefaultSource {
            name: "out".to_string(),
            value: Some("cfg".to_string()),
        });
        // Config is used when it is the only external source, even unpreferred.
        assert_eq!(record.resolve_default(), Some(("cfg", ValueOrigin::Config)));

        record.env_default = Some(DefaultSource {
            name: "OUT".to_string(),
            value: Some("env".to_string()),
        });
        assert_eq!(
            record.resolve_default(),
            Some(("env", ValueOrigin::Environment))
        );

        record.config_preferred = true;
        assert_eq!(record.resolve_default(), Some(("cfg", ValueOrigin::Config)));
    }

    #[test]
    fn union_keeps_order_and_skips_duplicates() {
        let mut list = vec!["-".to_string()];
        union_into(&mut list, vec!["--".to_string(), "-".to_string()]);
        assert_eq!(list, vec!["-".to_string(), "--".to_string()]);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            validate_names(&["v".to_string(), "  ".to_string()]),
            Err(Error::InvalidName)
        );
        assert!(validate_names(&["v".to_string()]).is_ok());
    }
}
