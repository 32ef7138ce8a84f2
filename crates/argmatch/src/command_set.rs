//! The command set: declaration-ordered parameters, conventions and the
//! entry points of a match pass.

use indexmap::IndexMap;

use crate::convention::Conventions;
use crate::error::{Error, Result};
use crate::kinds::{Arg, Flag, Opt, Param, ParameterKind};
use crate::matcher::{self, MatchReport};
use crate::parameter::Parameter;
use crate::source::ValueSource;

pub const DEFAULT_PREFIX: &str = "-";
pub const DEFAULT_SUFFIX: &str = "=";

/// A named, ordered set of parameters plus the conventions used to match them.
///
/// Parameters are kept in declaration order. Registering under an existing
/// key replaces the parameter in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSet {
    name: String,
    summary: String,
    description: String,
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    conventions: Conventions,
    parameters: IndexMap<String, Param>,
}

impl CommandSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            description: String::new(),
            prefixes: vec![DEFAULT_PREFIX.to_string()],
            suffixes: vec![DEFAULT_SUFFIX.to_string()],
            conventions: Conventions::default(),
            parameters: IndexMap::new(),
        }
    }

    /// Prefixes handed to parameters registered later. An empty list keeps
    /// the default.
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if !prefixes.is_empty() {
            self.prefixes = prefixes;
        }
        self
    }

    /// Value delimiters handed to parameters registered later. An empty list
    /// keeps the default.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let suffixes: Vec<String> = suffixes.into_iter().map(Into::into).collect();
        if !suffixes.is_empty() {
            self.suffixes = suffixes;
        }
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn conventions(&self) -> Conventions {
        self.conventions
    }

    /// Register a flag with the command-set prefixes. Override them on the
    /// returned handle with `set_prefix`.
    pub fn add_flag<N, S>(
        &mut self,
        key: impl Into<String>,
        names: N,
        help: impl Into<String>,
    ) -> Result<&mut Param>
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(Flag::new(key).into(), names, help)
    }

    pub fn add_option<N, S>(
        &mut self,
        key: impl Into<String>,
        names: N,
        help: impl Into<String>,
    ) -> Result<&mut Param>
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(Opt::new(key).into(), names, help)
    }

    /// Register a positional argument. Arguments are filled in the order they
    /// are registered.
    pub fn add_argument(
        &mut self,
        key: impl Into<String>,
        help: impl Into<String>,
    ) -> Result<&mut Param> {
        self.register(Arg::new(key).into(), Vec::<String>::new(), help)
    }

    fn register<N, S>(&mut self, mut param: Param, names: N, help: impl Into<String>) -> Result<&mut Param>
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        param.set_name(names)?;
        param.set_help(help);
        self.add(param)
    }

    /// Register a prepared parameter. Empty prefix or suffix lists inherit the
    /// command-set defaults.
    pub fn add(&mut self, param: impl Into<Param>) -> Result<&mut Param> {
        let mut param = param.into();
        if param.key().is_empty() {
            return Err(Error::EmptyKey);
        }
        if param.get_prefix().is_empty() {
            param.set_prefix(self.prefixes.iter().cloned(), false);
        }
        if param.get_suffix().is_empty() {
            param.set_suffix(self.suffixes.iter().cloned(), false);
        }

        let key = param.key().to_string();
        tracing::debug!(key = %key, kind = %param.kind(), names = ?param.record().names(), "registering parameter");
        let slot = match self.parameters.entry(key) {
            indexmap::map::Entry::Occupied(mut e) => {
                tracing::debug!(key = %e.key(), "replacing parameter");
                e.insert(param);
                e.into_mut()
            }
            indexmap::map::Entry::Vacant(e) => e.insert(param),
        };
        Ok(slot)
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.parameters.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Param> {
        self.parameters.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.parameters.keys()
    }

    /// Parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Param)> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn remove(&mut self, key: &str) -> Option<Param> {
        self.parameters.shift_remove(key)
    }

    /// Move a parameter to a new key, keeping its position. Returns `false`
    /// when `old` is not registered.
    pub fn rekey(&mut self, old: &str, new: impl Into<String>) -> Result<bool> {
        let new = new.into();
        if new.is_empty() {
            return Err(Error::EmptyKey);
        }
        let Some((index, _, mut param)) = self.parameters.shift_remove_full(old) else {
            return Ok(false);
        };
        param.set_key(new.clone())?;
        let mut index = index;
        if let Some((at, _, replaced)) = self.parameters.shift_remove_full(&new) {
            tracing::debug!(key = %new, kind = %replaced.kind(), "rekey replaced parameter");
            if at < index {
                index -= 1;
            }
        }
        let index = index.min(self.parameters.len());
        self.parameters.shift_insert(index, new, param);
        Ok(true)
    }

    /// POSIX short names: `-` plus one character.
    pub fn set_posix(&mut self, enabled: bool) {
        self.conventions.posix = enabled;
    }

    /// GNU long names: `--` plus a word, words split by `-`.
    pub fn set_gnu(&mut self, enabled: bool) {
        self.conventions.gnu = enabled;
    }

    /// Multics names: `-` plus one or more words split by `-` or `_`.
    pub fn set_multics(&mut self, enabled: bool) {
        if enabled && self.conventions.posix_groups {
            tracing::warn!("multics names combined with POSIX groups; groups take precedence");
        }
        self.conventions.multics = enabled;
    }

    /// RuneImp names: Multics plus `--abc` groups of single-letter names.
    /// Turns POSIX groups off.
    pub fn set_rune_imp(&mut self, enabled: bool) {
        if enabled && self.conventions.posix_groups {
            tracing::warn!("RuneImp groups replace POSIX groups");
            self.conventions.posix_groups = false;
        }
        self.conventions.rune_imp = enabled;
    }

    /// Expand `-abc` into `-a -b -c`. Turns RuneImp off.
    pub fn set_posix_groups(&mut self, enabled: bool) {
        if enabled && self.conventions.rune_imp {
            tracing::warn!("POSIX groups replace RuneImp groups");
            self.conventions.rune_imp = false;
        }
        if enabled && self.conventions.multics {
            tracing::warn!("POSIX groups combined with multics names; groups take precedence");
        }
        self.conventions.posix_groups = enabled;
    }

    pub fn set_conventions(&mut self, conventions: Conventions) {
        self.set_posix(conventions.posix);
        self.set_gnu(conventions.gnu);
        self.set_multics(conventions.multics);
        self.set_rune_imp(conventions.rune_imp);
        self.set_posix_groups(conventions.posix_groups);
    }

    /// Look up every registered environment and config default name.
    pub fn load_defaults(&mut self, env: &dyn ValueSource, config: &dyn ValueSource) {
        for param in self.parameters.values_mut() {
            param.load_defaults(env, config);
        }
    }

    /// Clear what the last match pass recorded.
    pub fn reset(&mut self) {
        for param in self.parameters.values_mut() {
            param.reset();
        }
    }

    /// Match `tokens` (program name excluded) against the declared parameters.
    pub fn match_command_line<I, S>(&mut self, tokens: I) -> MatchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        matcher::match_items(self, matcher::items_from_tokens(tokens))
    }

    /// Every required parameter without a usable value.
    ///
    /// A required flag must appear on the command line; options and arguments
    /// are satisfied by any source in the default chain.
    pub fn missing_required(&self) -> Vec<Error> {
        self.parameters
            .iter()
            .filter(|(_, p)| p.is_required())
            .filter_map(|(key, p)| {
                let source = match p.kind() {
                    ParameterKind::Flag if !p.is_set() => Error::FlagMissing,
                    ParameterKind::Flag => return None,
                    ParameterKind::Option | ParameterKind::Argument => p.get_value().err()?,
                };
                Some(Error::RequiredMissing {
                    key: key.clone(),
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// The first required parameter without a usable value.
    pub fn check_required(&self) -> Result<()> {
        match self.missing_required().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_inherits_command_set_prefixes() {
        let mut set = CommandSet::new("tool").with_prefixes(["-", "--"]);
        set.add_flag("verbose", ["v"], "Verbose output").unwrap();
        let verbose = set.get("verbose").unwrap();
        assert_eq!(verbose.get_prefix(), ["-".to_string(), "--".to_string()]);
        assert_eq!(verbose.get_suffix(), ["=".to_string()]);
        assert_eq!(verbose.help(), "Verbose output");
    }

    #[test]
    fn empty_prefix_list_keeps_default() {
        let set = CommandSet::new("tool").with_prefixes(Vec::<String>::new());
        assert_eq!(set.prefixes(), ["-".to_string()]);
    }

    #[test]
    fn prepared_parameter_keeps_its_own_prefixes() {
        let mut set = CommandSet::new("tool");
        let mut flag = Flag::new("help");
        flag.set_name(["?"]).unwrap();
        flag.set_prefix(["/"], false);
        set.add(flag).unwrap();
        assert_eq!(set.get("help").unwrap().get_prefix(), ["/".to_string()]);
    }

    #[test]
    fn invalid_registrations_fail() {
        let mut set = CommandSet::new("tool");
        assert_eq!(
            set.add_flag("verbose", ["v", ""], "").unwrap_err(),
            Error::InvalidName
        );
        assert_eq!(set.add_option("", ["o"], "").unwrap_err(), Error::EmptyKey);
        assert!(set.is_empty());
    }

    #[test]
    fn last_registration_under_a_key_wins_in_place() {
        let mut set = CommandSet::new("tool");
        set.add_flag("a", ["a"], "").unwrap();
        set.add_flag("b", ["b"], "").unwrap();
        set.add_option("a", ["alpha"], "").unwrap();

        assert_eq!(set.len(), 2);
        let keys: Vec<&String> = set.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(set.get("a").unwrap().kind(), ParameterKind::Option);
    }

    #[test]
    fn rekey_moves_parameter_and_keeps_position() {
        let mut set = CommandSet::new("tool");
        set.add_flag("a", ["a"], "").unwrap();
        set.add_flag("b", ["b"], "").unwrap();

        assert!(set.rekey("a", "alpha").unwrap());
        assert!(!set.rekey("missing", "x").unwrap());
        assert_eq!(set.rekey("b", ""), Err(Error::EmptyKey));

        let keys: Vec<&String> = set.keys().collect();
        assert_eq!(keys, ["alpha", "b"]);
        assert_eq!(set.get("alpha").unwrap().key(), "alpha");
    }

    #[test]
    fn rekey_onto_earlier_key_keeps_position() {
        let mut set = CommandSet::new("tool");
        set.add_flag("x", ["x"], "").unwrap();
        set.add_flag("y", ["y"], "").unwrap();
        set.add_flag("z", ["z"], "").unwrap();

        assert!(set.rekey("y", "x").unwrap());
        let keys: Vec<&String> = set.keys().collect();
        assert_eq!(keys, ["x", "z"]);
        assert_eq!(set.get("x").unwrap().get_name(), ["y".to_string()]);

        // Replacing a later key leaves the moved parameter in place.
        let mut set = CommandSet::new("tool");
        set.add_flag("x", ["x"], "").unwrap();
        set.add_flag("y", ["y"], "").unwrap();
        set.add_flag("z", ["z"], "").unwrap();

        assert!(set.rekey("x", "z").unwrap());
        let keys: Vec<&String> = set.keys().collect();
        assert_eq!(keys, ["z", "y"]);
        assert_eq!(set.get("z").unwrap().get_name(), ["x".to_string()]);
    }

    #[test]
    fn group_conventions_are_exclusive() {
        let mut set = CommandSet::new("tool");
        set.set_posix_groups(true);
        set.set_rune_imp(true);
        assert!(set.conventions().rune_imp);
        assert!(!set.conventions().posix_groups);

        set.set_posix_groups(true);
        assert!(set.conventions().posix_groups);
        assert!(!set.conventions().rune_imp);
    }

    #[test]
    fn set_conventions_applies_every_toggle() {
        let mut set = CommandSet::new("tool");
        set.set_conventions(Conventions {
            posix: true,
            gnu: true,
            multics: false,
            rune_imp: false,
            posix_groups: true,
        });
        let c = set.conventions();
        assert!(c.posix && c.gnu && c.posix_groups);
        assert!(!c.multics && !c.rune_imp);
    }

    #[test]
    fn check_required_reports_kind_specific_errors() {
        let mut set = CommandSet::new("tool");
        set.add_flag("force", ["f"], "").unwrap().set_required(true);
        set.add_option("out", ["o"], "").unwrap().set_required(true);
        set.add_argument("file", "").unwrap().set_required(true);

        let missing = set.missing_required();
        let sources: Vec<(String, Error)> = missing
            .into_iter()
            .map(|e| match e {
                Error::RequiredMissing { key, source } => (key, *source),
                other => panic!("unexpected error: {other:?}"),
            })
            .collect();
        assert_eq!(
            sources,
            vec![
                ("force".to_string(), Error::FlagMissing),
                ("out".to_string(), Error::Missing),
                ("file".to_string(), Error::ArgumentMissing),
            ]
        );

        set.match_command_line(["-f", "-o", "x", "in.txt"]);
        assert!(set.check_required().is_ok());
    }

    #[test]
    fn required_option_is_satisfied_by_default() {
        let mut set = CommandSet::new("tool");
        set.add_option("out", ["o"], "")
            .unwrap()
            .set_required(true);
        set.get_mut("out").unwrap().set_default("a.out");
        assert!(set.check_required().is_ok());

        set.match_command_line(["-o"]);
        let err = set.check_required().unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().contains("'out'"));
    }

    #[test]
    fn load_defaults_reaches_every_parameter() {
        let mut set = CommandSet::new("tool");
        set.add_option("out", ["o"], "")
            .unwrap()
            .set_env_default("TOOL_OUT")
            .unwrap();
        set.add_argument("file", "")
            .unwrap()
            .set_config_default("file")
            .unwrap();

        let env = vec![("TOOL_OUT".to_string(), "env.txt".to_string())];
        let config = vec![("file".to_string(), "cfg.txt".to_string())];
        set.load_defaults(&env, &config);

        assert_eq!(set.get("out").unwrap().get_value().unwrap(), "env.txt");
        assert_eq!(set.get("file").unwrap().get_value().unwrap(), "cfg.txt");
    }
}
