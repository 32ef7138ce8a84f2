//! Serializable form of a command set, for data-driven declarations.
//!
//! Every field goes through the same setters as the builder API, so a
//! declaration fails with the same errors a hand-written registration would.

use serde::{Deserialize, Serialize};

use crate::command_set::CommandSet;
use crate::convention::Conventions;
use crate::error::{Error, Result};
use crate::kinds::{Arg, Flag, Opt, Param, ParameterKind};
use crate::parameter::Parameter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSetDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub conventions: Conventions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterDecl {
    pub key: String,
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Empty means "inherit from the command set".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffixes: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Environment variable used as a default source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Config key used as a default source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default)]
    pub config_preferred: bool,
    /// Options only: `false` lets the option appear without a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_required: Option<bool>,
    /// Arguments only: fixed argv position, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl ParameterDecl {
    fn build(&self) -> Result<Param> {
        let mut param: Param = match self.kind {
            ParameterKind::Flag => Flag::new(self.key.clone()).into(),
            ParameterKind::Option => Opt::new(self.key.clone()).into(),
            ParameterKind::Argument => Arg::new(self.key.clone()).into(),
        };
        param.set_key(self.key.clone())?;
        param.set_name(self.names.iter().cloned())?;
        param.set_prefix(self.prefixes.iter().cloned(), false);
        param.set_suffix(self.suffixes.iter().cloned(), false);
        param.set_help(self.help.clone());
        if let Some(value_name) = &self.value_name {
            param.set_value_name(value_name.clone());
        }
        param.set_required(self.required);
        if let Some(default) = &self.default {
            param.set_default(default);
        }
        if let Some(env) = &self.env {
            param.set_env_default(env.clone())?;
        }
        if let Some(config) = &self.config {
            param.set_config_default(config.clone())?;
        }
        param.set_config_preferred(self.config_preferred);
        if let (Some(required), Some(opt)) = (self.value_required, param.as_option_mut()) {
            opt.set_value_required(required);
        }
        if let Some(arg) = param.as_argument_mut() {
            arg.set_position(self.position);
        }
        Ok(param)
    }
}

impl CommandSet {
    pub fn from_decl(decl: &CommandSetDecl) -> Result<Self> {
        let mut set = CommandSet::new(decl.name.clone())
            .with_summary(decl.summary.clone())
            .with_description(decl.description.clone())
            .with_prefixes(decl.prefixes.iter().cloned())
            .with_suffixes(decl.suffixes.iter().cloned());
        set.set_conventions(decl.conventions);
        for p in &decl.parameters {
            set.add(p.build()?)?;
        }
        Ok(set)
    }
}

impl TryFrom<CommandSetDecl> for CommandSet {
    type Error = Error;

    fn try_from(decl: CommandSetDecl) -> Result<Self> {
        CommandSet::from_decl(&decl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECL: &str = r#"{
        "name": "copy",
        "summary": "Copy files",
        "prefixes": ["-", "--"],
        "conventions": { "posix": true, "gnu": true, "posix-groups": true },
        "parameters": [
            { "key": "verbose", "kind": "flag", "names": ["v", "verbose"] },
            { "key": "out", "kind": "option", "names": ["o", "output"],
              "default": "a.out", "env": "COPY_OUT", "config": "out",
              "config-preferred": true },
            { "key": "src", "kind": "argument", "required": true, "value-name": "SRC" }
        ]
    }"#;

    #[test]
    fn declaration_builds_a_working_command_set() {
        let decl: CommandSetDecl = serde_json::from_str(DECL).unwrap();
        let mut set = CommandSet::try_from(decl).unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.conventions().posix_groups);
        assert_eq!(
            set.get("out").unwrap().get_prefix(),
            ["-".to_string(), "--".to_string()]
        );

        let config = vec![("out".to_string(), "cfg.out".to_string())];
        let env = vec![("COPY_OUT".to_string(), "env.out".to_string())];
        set.load_defaults(&env, &config);
        let report = set.match_command_line(["-v", "in.txt"]);

        assert!(report.is_complete());
        assert!(set.get("verbose").unwrap().get_flag());
        assert_eq!(set.get("out").unwrap().get_value().unwrap(), "cfg.out");
        assert_eq!(set.get("src").unwrap().get_value().unwrap(), "in.txt");
        assert!(set.check_required().is_ok());
    }

    #[test]
    fn declaration_carries_value_required_and_position() {
        let decl: CommandSetDecl = serde_json::from_str(
            r#"{
                "name": "paint",
                "prefixes": ["--"],
                "parameters": [
                    { "key": "color", "kind": "option", "names": ["color"],
                      "value-required": false, "default": "auto" },
                    { "key": "file", "kind": "argument" },
                    { "key": "mode", "kind": "argument", "position": 1 }
                ]
            }"#,
        )
        .unwrap();
        let mut set = CommandSet::from_decl(&decl).unwrap();
        assert!(!set.get("color").unwrap().as_option().unwrap().is_value_required());
        assert_eq!(set.get("mode").unwrap().as_argument().unwrap().position(), Some(1));

        let report = set.match_command_line(["fast", "--color", "in.png"]);
        assert!(report.is_complete());
        assert_eq!(set.get("mode").unwrap().get_value().unwrap(), "fast");
        assert_eq!(set.get("color").unwrap().get_value().unwrap(), "auto");
        assert_eq!(set.get("file").unwrap().get_value().unwrap(), "in.png");
    }

    #[test]
    fn declaration_errors_surface_from_setters() {
        let decl: CommandSetDecl = serde_json::from_str(
            r#"{ "name": "x", "parameters": [ { "key": "a", "kind": "flag", "names": [" "] } ] }"#,
        )
        .unwrap();
        assert_eq!(CommandSet::from_decl(&decl).unwrap_err(), Error::InvalidName);

        let decl: CommandSetDecl = serde_json::from_str(
            r#"{ "name": "x", "parameters": [ { "key": "a", "kind": "option", "env": "" } ] }"#,
        )
        .unwrap();
        assert_eq!(
            CommandSet::from_decl(&decl).unwrap_err(),
            Error::EmptyEnvDefaultName
        );

        let decl: CommandSetDecl = serde_json::from_str(
            r#"{ "name": "x", "parameters": [ { "key": "", "kind": "argument" } ] }"#,
        )
        .unwrap();
        assert_eq!(CommandSet::from_decl(&decl).unwrap_err(), Error::EmptyKey);
    }
}
