//! The composition root: one command set, the process argv, one match pass.

use std::sync::{Mutex, OnceLock};

use indexmap::IndexMap;

use crate::command_set::CommandSet;
use crate::matcher::MatchReport;
use crate::source::{ProcessEnv, ValueSource};

static GLOBAL: OnceLock<Mutex<RootCommand>> = OnceLock::new();

/// Root command set of a process plus the result of its single match pass.
///
/// Construct one with [`RootCommand::new`] and pass it by reference, or use
/// [`RootCommand::global`] for a process-wide instance.
#[derive(Debug)]
pub struct RootCommand {
    command_set: CommandSet,
    program: String,
    config: IndexMap<String, String>,
    report: Option<MatchReport>,
}

impl RootCommand {
    pub fn new(command_set: CommandSet) -> Self {
        Self {
            command_set,
            program: String::new(),
            config: IndexMap::new(),
            report: None,
        }
    }

    /// The process-wide root.
    ///
    /// `init` runs only on the first call; every later call returns the same
    /// instance without running `init` again, so parameters are registered
    /// exactly once.
    pub fn global<F>(init: F) -> &'static Mutex<RootCommand>
    where
        F: FnOnce() -> CommandSet,
    {
        GLOBAL.get_or_init(|| {
            let set = init();
            tracing::debug!(name = %set.name(), parameters = set.len(), "root command initialized");
            Mutex::new(RootCommand::new(set))
        })
    }

    /// Config values (already resolved to strings) used as config defaults.
    pub fn with_config<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.set_config(values);
        self
    }

    pub fn set_config<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    pub fn config(&self) -> &IndexMap<String, String> {
        &self.config
    }

    /// Match the process arguments.
    pub fn run(&mut self) -> &MatchReport {
        self.run_with(std::env::args())
    }

    /// Match `argv`, whose first item is the program name, with the process
    /// environment as the environment default source.
    pub fn run_with<I, S>(&mut self, argv: I) -> &MatchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_with_env(argv, &ProcessEnv)
    }

    /// Match `argv` with an explicit environment source.
    ///
    /// The pass happens once; later calls return the first report unchanged.
    pub fn run_with_env<I, S>(&mut self, argv: I, env: &dyn ValueSource) -> &MatchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.report.is_some() {
            tracing::warn!("match pass already ran; returning the first report");
        } else {
            let mut argv = argv.into_iter().map(Into::into);
            self.program = argv.next().unwrap_or_default();
            let tokens: Vec<String> = argv.collect();
            for (i, token) in tokens.iter().enumerate() {
                tracing::debug!(index = i + 1, token = %token, "argv");
            }

            self.command_set.load_defaults(env, &self.config);
            self.report = Some(self.command_set.match_command_line(tokens));
        }
        self.report.get_or_insert_with(MatchReport::default)
    }

    /// Program name from `argv[0]`; empty before the first run.
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn command_set(&self) -> &CommandSet {
        &self.command_set
    }

    /// Mutable access for registration before the first run.
    pub fn command_set_mut(&mut self) -> &mut CommandSet {
        &mut self.command_set
    }

    pub fn report(&self) -> Option<&MatchReport> {
        self.report.as_ref()
    }

    pub fn help(&self) -> String {
        self.command_set.help()
    }

    pub fn into_command_set(self) -> CommandSet {
        self.command_set
    }
}
