//! Option registration, matching, and help rendering for cmdr.
//!
//! The engine is intentionally small: a [`Command`] declares its options up
//! front (short flag, long flag with an optional value marker, description,
//! handler), then parses one argument vector. Matched options dispatch to
//! their handlers against caller-owned state; every other token accumulates
//! as a positional argument.
//!
//! Handlers are typed closures over the state the command owns, so per-option
//! behavior mutates that state directly:
//!
//! ```
//! use cmdr_opts::{Command, Outcome};
//!
//! #[derive(Default)]
//! struct Flags {
//!     verbose: bool,
//! }
//!
//! let mut command = Command::new("demo", "0.1.0", Flags::default());
//! command
//!     .option("-v", "--verbose", "enable verbose output", |flags, _context| {
//!         flags.verbose = true;
//!     })
//!     .unwrap();
//!
//! let argv: Vec<String> = ["demo", "-v", "input.txt"].map(String::from).into();
//! assert_eq!(command.parse(&argv).unwrap(), Outcome::Completed);
//! assert!(command.state().verbose);
//! assert_eq!(command.additional_args(), ["input.txt"]);
//! ```

use std::fmt;

use thiserror::Error;

/// Whether an option consumes the token following its flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    None,
    Optional,
    Required,
}

/// How a parse call ended.
///
/// Help and version are abort signals, not failures: no further tokens are
/// processed once one fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every token was consumed.
    Completed,
    /// A built-in help option fired and rendered usage.
    HelpRequested,
    /// A built-in version option fired and printed the version string.
    VersionRequested,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Registration declared neither a short nor a long flag.
    #[error("option declares neither a short nor a long flag")]
    MissingFlag,
    /// The long-flag text opens a value marker it never closes.
    #[error("unbalanced value marker in `{0}`")]
    UnbalancedMarker(String),
    /// A required-value option was matched at the end of the input.
    #[error("missing value for `{flag}`")]
    MissingValue { flag: String },
}

/// Per-match view handed to option handlers.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// The flag token as it appeared in the argument vector.
    pub flag: &'a str,
    /// The extracted value, if the option's arity produced one.
    pub value: Option<&'a str>,
    /// Index of the flag within the argument vector passed to [`Command::parse`].
    pub cursor: usize,
}

type Handler<S> = Box<dyn FnMut(&mut S, &ParseContext<'_>)>;

enum Action<S> {
    Help,
    Version,
    Call(Handler<S>),
}

struct OptionSpec<S> {
    short: Option<String>,
    long: Option<String>,
    marker: Option<String>,
    description: String,
    arity: Arity,
    action: Action<S>,
}

impl<S> OptionSpec<S> {
    fn matches(&self, token: &str) -> bool {
        self.short.as_deref() == Some(token) || self.long.as_deref() == Some(token)
    }

    /// Left-hand help column: `-r, --required <arg>`.
    fn flag_column(&self) -> String {
        let mut out = match (&self.short, &self.long) {
            (Some(short), Some(long)) => format!("{short}, {long}"),
            (Some(short), None) => short.clone(),
            (None, Some(long)) => long.clone(),
            (None, None) => String::new(),
        };
        if let Some(marker) = &self.marker {
            out.push(' ');
            out.push_str(marker);
        }
        out
    }
}

/// Split a long-flag string into its bare flag and trailing value marker.
///
/// `--required <arg>` is a required value, `--optional [arg]` an optional one,
/// anything without a marker takes no value. An opened marker must close.
fn split_marker(text: &str) -> Result<(Option<String>, Option<String>, Arity), Error> {
    let text = text.trim();
    if text.is_empty() {
        return Ok((None, None, Arity::None));
    }
    let Some(start) = text.find(['<', '[']) else {
        return Ok((Some(text.to_string()), None, Arity::None));
    };

    let marker = &text[start..];
    let arity = if marker.starts_with('<') {
        if !marker.ends_with('>') {
            return Err(Error::UnbalancedMarker(text.to_string()));
        }
        Arity::Required
    } else {
        if !marker.ends_with(']') {
            return Err(Error::UnbalancedMarker(text.to_string()));
        }
        Arity::Optional
    };

    let flag = text[..start].trim_end();
    let flag = (!flag.is_empty()).then(|| flag.to_string());
    Ok((flag, Some(marker.to_string()), arity))
}

/// The user-facing command facade.
///
/// Owns the option registry, the positional arguments collected by the last
/// parse, and the caller state `S` that handlers mutate. Built-in
/// `-h/--help` and `-V/--version` options are registered at construction,
/// ahead of any user options; lookup is first-registered-wins, so reusing
/// their flag text does not shadow them.
///
/// Parsing is single-threaded and synchronous. The registry has no internal
/// locking; registration and parsing must not be interleaved across threads.
pub struct Command<S> {
    name: String,
    version: String,
    usage: String,
    specs: Vec<OptionSpec<S>>,
    rest: Vec<String>,
    state: S,
}

impl<S> fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("usage", &self.usage)
            .field("options", &self.specs.len())
            .field("rest", &self.rest)
            .finish()
    }
}

impl<S> Command<S> {
    pub fn new(name: impl Into<String>, version: impl Into<String>, state: S) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            usage: String::from("[options]"),
            specs: vec![
                OptionSpec {
                    short: Some("-h".to_string()),
                    long: Some("--help".to_string()),
                    marker: None,
                    description: "Show help information".to_string(),
                    arity: Arity::None,
                    action: Action::Help,
                },
                OptionSpec {
                    short: Some("-V".to_string()),
                    long: Some("--version".to_string()),
                    marker: None,
                    description: "Show version information".to_string(),
                    arity: Arity::None,
                    action: Action::Version,
                },
            ],
            rest: Vec::new(),
            state,
        }
    }

    /// Override the synthesized `[options]` usage line.
    pub fn set_usage(&mut self, usage: impl Into<String>) {
        self.usage = usage.into();
    }

    /// Register one option.
    ///
    /// Blank flag text means "absent"; at least one flag must be given. The
    /// long-flag text may end in `<name>` (required value) or `[name]`
    /// (optional value). The handler runs once per match, receiving the
    /// caller state and the [`ParseContext`] for that match.
    pub fn option<F>(
        &mut self,
        short: &str,
        long: &str,
        description: &str,
        handler: F,
    ) -> Result<&mut Self, Error>
    where
        F: FnMut(&mut S, &ParseContext<'_>) + 'static,
    {
        let short = short.trim();
        let short = (!short.is_empty()).then(|| short.to_string());
        let (long, marker, arity) = split_marker(long)?;
        if short.is_none() && long.is_none() {
            return Err(Error::MissingFlag);
        }

        self.specs.push(OptionSpec {
            short,
            long,
            marker,
            description: description.trim().to_string(),
            arity,
            action: Action::Call(Box::new(handler)),
        });
        Ok(self)
    }

    /// Parse one argument vector.
    ///
    /// `argv[0]` is the program name and is skipped. Tokens matching a
    /// registered flag dispatch to that option; a required-arity option
    /// always consumes the next token as its value, an optional-arity option
    /// consumes it only if it is not itself a registered flag. Every other
    /// token, including flag-looking tokens that are not registered, is
    /// collected as a positional argument.
    ///
    /// Calling `parse` again on the same command starts fresh: the positional
    /// arguments of the previous run are discarded.
    pub fn parse(&mut self, argv: &[String]) -> Result<Outcome, Error> {
        self.rest.clear();

        let mut i = 1;
        while i < argv.len() {
            let token = argv[i].as_str();
            let Some(idx) = self.lookup(token) else {
                tracing::debug!("collected positional argument {token}");
                self.rest.push(token.to_string());
                i += 1;
                continue;
            };

            let flag_at = i;
            let value = match self.specs[idx].arity {
                Arity::Required => match argv.get(i + 1) {
                    Some(next) => {
                        i += 1;
                        Some(next.as_str())
                    }
                    None => {
                        eprint!("{}", self.help_text());
                        return Err(Error::MissingValue {
                            flag: token.to_string(),
                        });
                    }
                },
                Arity::Optional => match argv.get(i + 1) {
                    Some(next) if self.lookup(next).is_none() => {
                        i += 1;
                        Some(next.as_str())
                    }
                    _ => None,
                },
                Arity::None => None,
            };

            tracing::debug!("matched option {token}");
            let context = ParseContext {
                flag: token,
                value,
                cursor: flag_at,
            };

            // Built-in help/version abort the parse before any further token
            // is consumed; user handlers run and the scan continues.
            match &self.specs[idx].action {
                Action::Help => {
                    print!("{}", self.help_text());
                    return Ok(Outcome::HelpRequested);
                }
                Action::Version => {
                    println!("{}", self.version);
                    return Ok(Outcome::VersionRequested);
                }
                Action::Call(_) => {}
            }
            if let Action::Call(handler) = &mut self.specs[idx].action {
                handler(&mut self.state, &context);
            }

            i += 1;
        }

        Ok(Outcome::Completed)
    }

    /// Positional arguments of the last parse, in encounter order.
    ///
    /// Final once the parse completed; after an abort it holds the tokens
    /// collected up to the abort point.
    pub fn additional_args(&self) -> &[String] {
        self.rest.as_slice()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    /// Render the help text: name, version, usage line, then one
    /// column-aligned row per option in registration order.
    pub fn help_text(&self) -> String {
        let rows: Vec<(String, &str)> = self
            .specs
            .iter()
            .map(|spec| (spec.flag_column(), spec.description.as_str()))
            .collect();
        let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);

        let mut out = String::new();
        out.push_str(&format!("{} {}\n", self.name, self.version));
        out.push_str(&format!("\nUsage: {} {}\n", self.name, self.usage));
        out.push_str("\nOptions:\n");
        for (left, description) in rows {
            out.push_str(&format!("  {:width$}  {}\n", left, description, width = width));
        }
        out
    }

    /// Render usage to stderr.
    ///
    /// The caller-driven abort path, for policies the engine does not impose
    /// itself (for example "too many positional arguments"). The decision to
    /// exit the process stays with the caller.
    pub fn help(&self) {
        eprint!("{}", self.help_text());
    }

    /// First-registered spec whose short or long flag equals `token`.
    fn lookup(&self, token: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.matches(token))
    }
}
