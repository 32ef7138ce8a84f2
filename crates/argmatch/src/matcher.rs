//! The match pass: raw tokens in, matched parameters and an annotated token
//! list out.
//!
//! Per token, in order:
//! - `--` stops name matching; later tokens are positional only
//! - an exact `prefix + name` spelling
//! - a group (`-abc`, or `--abc` under RuneImp) is expanded when every
//!   character resolves to a declared single-character name
//! - an attached `prefix + name + suffix + value` spelling
//!
//! Among spellings the longest prefix wins and ties go to declaration order.
//! Tokens left over go to arguments: pinned positions first, then
//! declaration order. The pass never fails; unmatched tokens are reported,
//! not rejected.

use crate::command_set::CommandSet;
use crate::kinds::{Opt, Param, ParameterKind};
use crate::parameter::Parameter;

/// Stops name matching for the rest of the tokens.
pub const SEPARATOR: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    Unscanned,
    /// Consumed by the listed parameters (several for an expanded group).
    Matched { keys: Vec<String> },
    Unmatched,
    Separator,
}

/// One input token during a match pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchItem {
    /// Position in the process argv (the program name is index 0).
    pub index: usize,
    pub value: String,
    pub state: MatchState,
}

impl MatchItem {
    pub fn new(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
            state: MatchState::Unscanned,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.state, MatchState::Matched { .. })
    }

    pub fn is_unmatched(&self) -> bool {
        self.state == MatchState::Unmatched
    }

    fn consume(&mut self, key: &str) {
        self.state = MatchState::Matched {
            keys: vec![key.to_string()],
        };
    }
}

/// Wrap tokens (program name already removed) with their argv indices.
pub fn items_from_tokens<I, S>(tokens: I) -> Vec<MatchItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokens
        .into_iter()
        .enumerate()
        .map(|(i, t)| MatchItem::new(i + 1, t))
        .collect()
}

/// Outcome of one match pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    items: Vec<MatchItem>,
}

impl MatchReport {
    pub fn items(&self) -> &[MatchItem] {
        &self.items
    }

    pub fn matched(&self) -> impl Iterator<Item = &MatchItem> {
        self.items.iter().filter(|i| i.is_matched())
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &MatchItem> {
        self.items.iter().filter(|i| i.is_unmatched())
    }

    pub fn unmatched_values(&self) -> Vec<&str> {
        self.unmatched().map(|i| i.value.as_str()).collect()
    }

    /// Whether every token was consumed.
    pub fn is_complete(&self) -> bool {
        self.unmatched().next().is_none()
    }

    pub fn into_items(self) -> Vec<MatchItem> {
        self.items
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Spelling {
    Exact,
    Attached(String),
}

#[derive(Debug)]
struct SpellingMatch {
    key: String,
    prefix_len: usize,
    spelling: Spelling,
}

impl SpellingMatch {
    fn outranks(&self, other: &SpellingMatch) -> bool {
        let exact = |m: &SpellingMatch| m.spelling == Spelling::Exact;
        (self.prefix_len, exact(self)) > (other.prefix_len, exact(other))
    }
}

/// Find the parameter a token spells, if any.
fn find_spelling(set: &CommandSet, token: &str) -> Option<SpellingMatch> {
    let conventions = set.conventions();
    let mut best: Option<SpellingMatch> = None;

    for (key, param) in set.iter() {
        for prefix in param.get_prefix() {
            let Some(rest) = token.strip_prefix(prefix.as_str()) else {
                continue;
            };
            for name in param.get_name() {
                if !conventions.accepts(prefix, name) {
                    tracing::trace!(token, key = %key, prefix = %prefix, name = %name, "spelling rejected by conventions");
                    continue;
                }
                let spelling = if rest == name {
                    Spelling::Exact
                } else if let Some(after) = rest.strip_prefix(name.as_str()) {
                    let attached = param
                        .get_suffix()
                        .iter()
                        .filter(|s| !s.is_empty())
                        .find_map(|s| after.strip_prefix(s.as_str()));
                    match attached {
                        Some(value) => Spelling::Attached(value.to_string()),
                        None => continue,
                    }
                } else {
                    continue;
                };

                let candidate = SpellingMatch {
                    key: key.clone(),
                    prefix_len: prefix.len(),
                    spelling,
                };
                if best.as_ref().is_none_or(|b| candidate.outranks(b)) {
                    best = Some(candidate);
                }
            }
        }
    }

    best
}

#[derive(Debug)]
enum GroupMember {
    Flag(String),
    /// An option inside a group takes the remainder of the group as its value.
    Option(String, String),
}

fn find_short(set: &CommandSet, prefix: &str, c: char) -> Option<(String, ParameterKind)> {
    let mut buf = [0u8; 4];
    let name: &str = c.encode_utf8(&mut buf);
    set.iter()
        .find(|(_, p)| {
            p.get_prefix().iter().any(|x| x == prefix) && p.get_name().iter().any(|n| n == name)
        })
        .map(|(k, p)| (k.clone(), p.kind()))
}

/// Resolve a grouped token into its members; `None` unless every character
/// up to the first option is a declared single-character name.
fn resolve_group(set: &CommandSet, token: &str) -> Option<Vec<GroupMember>> {
    let conventions = set.conventions();
    let body = conventions.split_group(token)?;
    let prefix = conventions.group_prefix()?;

    let mut members = Vec::new();
    for (offset, c) in body.char_indices() {
        let (key, kind) = find_short(set, prefix, c)?;
        match kind {
            ParameterKind::Flag => members.push(GroupMember::Flag(key)),
            ParameterKind::Option => {
                let rest = &body[offset + c.len_utf8()..];
                let rest = set
                    .get(&key)
                    .and_then(|p| {
                        p.get_suffix()
                            .iter()
                            .filter(|s| !s.is_empty())
                            .find_map(|s| rest.strip_prefix(s.as_str()))
                    })
                    .unwrap_or(rest);
                members.push(GroupMember::Option(key, rest.to_string()));
                break;
            }
            ParameterKind::Argument => return None,
        }
    }
    Some(members)
}

/// Consume the token after an option as its value, unless it is missing, the
/// separator, already consumed, or itself a declared spelling.
fn take_next_value(
    set: &CommandSet,
    items: &mut [MatchItem],
    next: usize,
    key: &str,
) -> Option<String> {
    let item = items.get_mut(next)?;
    if item.state != MatchState::Unscanned
        || item.value == SEPARATOR
        || find_spelling(set, &item.value).is_some()
    {
        return None;
    }
    item.consume(key);
    Some(item.value.clone())
}

/// Whether a bare option reaches for the following token.
fn wants_next_value(set: &CommandSet, key: &str) -> bool {
    set.get(key)
        .and_then(Param::as_option)
        .is_some_and(Opt::is_value_required)
}

fn apply_option_value(set: &mut CommandSet, key: &str, value: Option<String>, index: usize) {
    if let Some(Param::Option(opt)) = set.get_mut(key) {
        match value {
            Some(v) => opt.set_value(&v),
            None => opt.mark_without_value(),
        }
        opt.record_mut().index = Some(index);
    }
}

fn apply_group(set: &mut CommandSet, items: &mut [MatchItem], at: usize, members: Vec<GroupMember>) {
    let index = items[at].index;
    let mut keys = Vec::with_capacity(members.len());

    for member in members {
        match member {
            GroupMember::Flag(key) => {
                if let Some(param) = set.get_mut(&key) {
                    param.set_flag();
                    param.record_mut().index = Some(index);
                }
                keys.push(key);
            }
            GroupMember::Option(key, rest) => {
                let value = if rest.is_empty() {
                    if wants_next_value(set, &key) {
                        take_next_value(set, items, at + 1, &key)
                    } else {
                        None
                    }
                } else {
                    Some(rest)
                };
                apply_option_value(set, &key, value, index);
                keys.push(key);
            }
        }
    }

    tracing::debug!(index, token = %items[at].value, keys = ?keys, "group matched");
    items[at].state = MatchState::Matched { keys };
}

fn apply_spelling(set: &mut CommandSet, items: &mut [MatchItem], at: usize, m: SpellingMatch) {
    let index = items[at].index;
    let token = items[at].value.clone();
    items[at].consume(&m.key);
    tracing::debug!(index, token = %token, key = %m.key, "matched");

    let Some(kind) = set.get(&m.key).map(|p| p.kind()) else {
        return;
    };

    if kind == ParameterKind::Option {
        let value = match m.spelling {
            Spelling::Attached(v) => Some(v),
            Spelling::Exact if wants_next_value(set, &m.key) => {
                take_next_value(set, items, at + 1, &m.key)
            }
            Spelling::Exact => None,
        };
        apply_option_value(set, &m.key, value, index);
        return;
    }

    let Some(param) = set.get_mut(&m.key) else {
        return;
    };
    match (&mut *param, m.spelling) {
        (Param::Flag(flag), Spelling::Exact) => flag.set_flag(),
        (Param::Flag(flag), Spelling::Attached(v)) => flag.set_value(&v),
        (Param::Argument(arg), _) => arg.set_value(&token),
        (Param::Option(_), _) => {}
    }
    param.record_mut().index = Some(index);
}

fn assign_argument(set: &mut CommandSet, item: &mut MatchItem, key: &str) {
    if let Some(param) = set.get_mut(key) {
        param.set_value(&item.value);
        param.record_mut().index = Some(item.index);
    }
    tracing::debug!(index = item.index, token = %item.value, key = %key, "positional assigned");
    item.consume(key);
}

/// Assign leftover tokens to arguments. Arguments pinned to a position take
/// the token at that argv index first; the rest fill in declaration order.
/// Before the separator, tokens that look like options (`-x`) are not
/// eligible for the ordered fill.
fn assign_positionals(set: &mut CommandSet, items: &mut [MatchItem]) {
    let mut pinned = Vec::new();
    let mut ordered = Vec::new();
    for (key, param) in set.iter() {
        if let Param::Argument(arg) = param {
            match arg.position() {
                Some(position) => pinned.push((key.clone(), position)),
                None => ordered.push(key.clone()),
            }
        }
    }

    for (key, position) in pinned {
        let slot = items
            .iter_mut()
            .find(|i| i.index == position && i.state == MatchState::Unscanned);
        match slot {
            Some(item) => assign_argument(set, item, &key),
            None => tracing::trace!(key = %key, position, "no token at pinned position"),
        }
    }

    let mut keys = ordered.into_iter();
    let mut after_separator = false;

    for item in items.iter_mut() {
        if item.state == MatchState::Separator {
            after_separator = true;
            continue;
        }
        if item.state != MatchState::Unscanned {
            continue;
        }
        if !after_separator && item.value.starts_with('-') && item.value != "-" {
            continue;
        }
        let Some(key) = keys.next() else {
            break;
        };
        assign_argument(set, item, &key);
    }
}

/// Run one match pass of `items` against `set`.
pub fn match_items(set: &mut CommandSet, mut items: Vec<MatchItem>) -> MatchReport {
    let mut after_separator = false;

    for at in 0..items.len() {
        if after_separator || items[at].state != MatchState::Unscanned {
            continue;
        }
        if items[at].value == SEPARATOR {
            items[at].state = MatchState::Separator;
            after_separator = true;
            continue;
        }

        // A whole-token spelling beats reading the token as a group.
        let spelling = find_spelling(set, &items[at].value);
        let exact = spelling
            .as_ref()
            .is_some_and(|m| m.spelling == Spelling::Exact);
        if !exact {
            if let Some(members) = resolve_group(set, &items[at].value) {
                apply_group(set, &mut items, at, members);
                continue;
            }
        }

        match spelling {
            Some(m) => apply_spelling(set, &mut items, at, m),
            None => tracing::trace!(index = items[at].index, token = %items[at].value, "no match"),
        }
    }

    assign_positionals(set, &mut items);

    for item in &mut items {
        if item.state == MatchState::Unscanned {
            item.state = MatchState::Unmatched;
        }
    }
    for item in &items {
        tracing::debug!(index = item.index, token = %item.value, state = ?item.state, "args");
    }

    MatchReport { items }
}
