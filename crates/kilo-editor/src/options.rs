//! Editor options.
//!
//! Option values live on [`Options`]; this module also parses the
//! `name=value` directives that set them (from the command line's `--set`).
//!
//! # Option names
//!
//! Both full names and abbreviations are accepted:
//!
//! | Full name        | Abbrev | Range   | Default |
//! |------------------|--------|---------|---------|
//! | `tabstop`        | `ts`   | 1–16    | 4       |
//! | `quittimes`      | `qt`   | 0–9     | 3       |
//! | `messagetimeout` | `mt`   | 1–60 s  | 5       |

use std::time::Duration;

use thiserror::Error;

/// Render width of a tab stop.
pub const TAB_STOP: usize = 4;

/// Extra Ctrl-Q presses needed to quit with unsaved changes.
pub const QUIT_TIMES: u8 = 3;

/// How long a status message stays on screen.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime-tunable editor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Tabs expand to the next multiple of this many columns.
    pub tab_stop: usize,
    /// Ctrl-Q presses refused before a dirty buffer may be abandoned.
    pub quit_times: u8,
    /// Lifetime of the status message.
    pub message_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: TAB_STOP,
            quit_times: QUIT_TIMES,
            message_timeout: MESSAGE_TIMEOUT,
        }
    }
}

/// A rejected option directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("expected NAME=VALUE, got `{0}`")]
    Malformed(String),

    #[error("unknown option `{0}`")]
    Unknown(String),

    #[error("invalid value `{value}` for {name}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Canonical option name for a full name or abbreviation.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name {
        "tabstop" | "ts" => Some("tabstop"),
        "quittimes" | "qt" => Some("quittimes"),
        "messagetimeout" | "mt" => Some("messagetimeout"),
        _ => None,
    }
}

impl Options {
    /// Apply a single `name=value` directive.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the directive is malformed, names an
    /// unknown option, or carries a value outside the option's range. The
    /// options are left unchanged on error.
    pub fn apply(&mut self, directive: &str) -> Result<(), OptionError> {
        let (name, value) = directive
            .split_once('=')
            .ok_or_else(|| OptionError::Malformed(directive.to_string()))?;
        let name = name.trim();
        let value = value.trim();

        let canonical =
            canonical_name(name).ok_or_else(|| OptionError::Unknown(name.to_string()))?;

        match canonical {
            "tabstop" => {
                let n = parse_in_range(canonical, value, 1, 16)?;
                self.tab_stop = usize::try_from(n).unwrap_or(TAB_STOP);
            }
            "quittimes" => {
                let n = parse_in_range(canonical, value, 0, 9)?;
                self.quit_times = u8::try_from(n).unwrap_or(QUIT_TIMES);
            }
            _ => {
                let n = parse_in_range(canonical, value, 1, 60)?;
                self.message_timeout = Duration::from_secs(n);
            }
        }
        Ok(())
    }

    /// Apply directives in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first [`OptionError`] encountered. Directives before it
    /// have already been applied.
    pub fn apply_all<'a, I>(&mut self, directives: I) -> Result<(), OptionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        directives.into_iter().try_for_each(|d| self.apply(d))
    }
}

fn parse_in_range(name: &'static str, value: &str, min: u64, max: u64) -> Result<u64, OptionError> {
    let n: u64 = value.parse().map_err(|_| OptionError::NotANumber {
        name,
        value: value.to_string(),
    })?;
    if (min..=max).contains(&n) {
        Ok(n)
    } else {
        Err(OptionError::OutOfRange {
            name,
            value: n,
            min,
            max,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.tab_stop, 4);
        assert_eq!(o.quit_times, 3);
        assert_eq!(o.message_timeout, Duration::from_secs(5));
    }

    #[test]
    fn full_names_and_abbreviations() {
        let mut o = Options::default();
        o.apply("tabstop=8").unwrap();
        assert_eq!(o.tab_stop, 8);
        o.apply("ts=2").unwrap();
        assert_eq!(o.tab_stop, 2);
        o.apply("qt=0").unwrap();
        assert_eq!(o.quit_times, 0);
        o.apply("messagetimeout=10").unwrap();
        assert_eq!(o.message_timeout, Duration::from_secs(10));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let mut o = Options::default();
        o.apply(" ts = 3 ").unwrap();
        assert_eq!(o.tab_stop, 3);
    }

    #[test]
    fn malformed_directive() {
        let mut o = Options::default();
        assert_eq!(
            o.apply("tabstop"),
            Err(OptionError::Malformed("tabstop".into()))
        );
    }

    #[test]
    fn unknown_option() {
        let mut o = Options::default();
        assert_eq!(o.apply("wrap=1"), Err(OptionError::Unknown("wrap".into())));
    }

    #[test]
    fn non_numeric_value() {
        let mut o = Options::default();
        assert_eq!(
            o.apply("ts=wide"),
            Err(OptionError::NotANumber {
                name: "tabstop",
                value: "wide".into()
            })
        );
    }

    #[test]
    fn out_of_range_leaves_options_unchanged() {
        let mut o = Options::default();
        let err = o.apply("ts=0").unwrap_err();
        assert_eq!(err.to_string(), "tabstop must be between 1 and 16, got 0");
        assert_eq!(o, Options::default());
    }

    #[test]
    fn apply_all_stops_at_first_error() {
        let mut o = Options::default();
        let result = o.apply_all(["ts=8", "bogus=1", "qt=1"]);
        assert_eq!(result, Err(OptionError::Unknown("bogus".into())));
        assert_eq!(o.tab_stop, 8);
        assert_eq!(o.quit_times, QUIT_TIMES);
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name("ts"), Some("tabstop"));
        assert_eq!(canonical_name("mt"), Some("messagetimeout"));
        assert_eq!(canonical_name("number"), None);
    }
}
