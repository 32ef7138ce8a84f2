//! Help text rendered from a command set.

use crate::command_set::CommandSet;
use crate::kinds::{Param, ParameterKind};
use crate::parameter::Parameter;

fn format_value_name(param: &Param) -> String {
    param
        .record()
        .value_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| param.key().to_ascii_uppercase())
}

/// Every `prefix + name` spelling the command set's conventions accept.
fn spellings(set: &CommandSet, param: &Param) -> Vec<String> {
    let conventions = set.conventions();
    let mut out = Vec::new();
    for name in param.get_name() {
        for prefix in param.get_prefix() {
            if conventions.accepts(prefix, name) {
                out.push(format!("{prefix}{name}"));
            }
        }
    }
    out
}

fn format_left(set: &CommandSet, param: &Param) -> String {
    match param.kind() {
        ParameterKind::Argument => {
            let n = format_value_name(param);
            if param.is_required() {
                format!("<{n}>")
            } else {
                format!("[{n}]")
            }
        }
        ParameterKind::Flag => spellings(set, param).join(", "),
        ParameterKind::Option => {
            let mut out = spellings(set, param).join(", ");
            let value = format_value_name(param);
            match param.as_option() {
                Some(opt) if !opt.is_value_required() => out.push_str(&format!(" [<{value}>]")),
                _ => out.push_str(&format!(" <{value}>")),
            }
            out
        }
    }
}

fn format_help(param: &Param) -> String {
    let record = param.record();
    let mut notes: Vec<String> = Vec::new();
    if record.is_required() && param.kind() != ParameterKind::Argument {
        notes.push("(required)".to_string());
    }
    if let Some(default_value) = record.default_value() {
        notes.push(format!("[default: {default_value}]"));
    }
    if param.kind() != ParameterKind::Flag {
        if let Some(env) = record.env_default() {
            notes.push(format!("[env: {}]", env.name));
        }
        if let Some(config) = record.config_default() {
            notes.push(format!("[config: {}]", config.name));
        }
    }

    let mut out = record.help().trim().to_string();
    for note in notes {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&note);
    }
    out
}

fn push_rows(out: &mut String, title: &str, rows: Vec<(String, String)>) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {}\n", left));
        } else {
            out.push_str(&format!("  {:width$}  {}\n", left, help, width = width));
        }
    }
}

impl CommandSet {
    /// Usage line plus one row per declared parameter.
    pub fn help(&self) -> String {
        let mut out = String::new();
        if self.summary().trim().is_empty() {
            out.push_str(self.name());
            out.push('\n');
        } else {
            out.push_str(&format!("{} - {}\n", self.name(), self.summary().trim()));
        }

        let mut usage = format!("Usage: {}", self.name());
        if self.iter().any(|(_, p)| p.kind() != ParameterKind::Argument) {
            usage.push_str(" [OPTIONS]");
        }
        for (_, p) in self.iter().filter(|(_, p)| p.kind() == ParameterKind::Argument) {
            usage.push(' ');
            usage.push_str(&format_left(self, p));
        }
        out.push_str(&format!("\n{usage}\n"));

        if !self.description().trim().is_empty() {
            out.push('\n');
            out.push_str(self.description().trim_end());
            out.push('\n');
        }

        let (arguments, options): (Vec<&Param>, Vec<&Param>) = self
            .iter()
            .map(|(_, p)| p)
            .partition(|p| p.kind() == ParameterKind::Argument);

        let rows = |params: Vec<&Param>| -> Vec<(String, String)> {
            params
                .into_iter()
                .map(|p| (format_left(self, p), format_help(p)))
                .collect()
        };
        push_rows(&mut out, "Arguments", rows(arguments));
        push_rows(&mut out, "Options", rows(options));

        out
    }
}
