//! Command-line parameter declaration and matching.
//!
//! Declare flags, options and positional arguments on a [`CommandSet`], hand
//! it the raw tokens, then query resolved values by key. Values resolve in
//! order: command line, then config and environment defaults (preference is
//! per parameter), then the static default.
//!
//! ```
//! use argmatch::{CommandSet, Parameter};
//!
//! let mut set = CommandSet::new("copy").with_prefixes(["-", "--"]);
//! set.set_posix(true);
//! set.set_gnu(true);
//! set.add_flag("verbose", ["v", "verbose"], "Verbose output").unwrap();
//! set.add_option("out", ["o", "output"], "Output file")
//!     .unwrap()
//!     .set_default("a.out");
//! set.add_argument("src", "Source file").unwrap();
//!
//! let report = set.match_command_line(["-v", "in.txt"]);
//! assert!(report.is_complete());
//! assert!(set.get("verbose").unwrap().get_flag());
//! assert_eq!(set.get("out").unwrap().get_value().unwrap(), "a.out");
//! assert_eq!(set.get("src").unwrap().get_value().unwrap(), "in.txt");
//! ```

pub mod command_set;
pub mod convention;
pub mod declaration;
pub mod error;
mod help;
pub mod kinds;
pub mod matcher;
pub mod parameter;
pub mod root;
pub mod source;

pub use command_set::{CommandSet, DEFAULT_PREFIX, DEFAULT_SUFFIX};
pub use convention::Conventions;
pub use declaration::{CommandSetDecl, ParameterDecl};
pub use error::{Error, Result};
pub use kinds::{Arg, Flag, Opt, Param, ParameterKind};
pub use matcher::{MatchItem, MatchReport, MatchState};
pub use parameter::{is_truthy, DefaultSource, Parameter, ParameterRecord, ValueOrigin};
pub use root::RootCommand;
pub use source::{NoValues, ProcessEnv, ValueSource};
