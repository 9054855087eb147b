//! Command line parsing for scaffolded applications.
//!
//! Every application gets the same two built-in options, `-h`/`--help` and
//! `-c`/`--config`. Anything else on the command line is kept rather than
//! rejected: unrecognized options land in [`AppOptions::extras`] and
//! positional operands in [`AppOptions::arguments`], so applications can
//! read their own flags without declaring them to the scaffold.
//!
//! The options region ends at the first bare token (or a literal `--`);
//! everything after that is positional. An unrecognized option followed by
//! a bare token takes that token as its value, the same way single options
//! with optional values behave in getopt-style parsers. Applications that
//! want a hyphen-free operand untouched can separate it with `--`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use crate::error::{Result, SoloistError};

/// The built-in options every scaffolded application understands, as
/// (short, long, description) rows of the usage text.
const BUILTIN_OPTIONS: &[(&str, &str, &str)] = &[
    ("h", "help", "Show this message"),
    ("c", "config", "Path to configuration ini file"),
];

/// Raw clap surface: the two built-in options plus a trailing catch-all.
///
/// Clap's own help and version machinery is disabled; the scaffold renders
/// its usage text itself. The catch-all accepts hyphen values so unknown
/// options flow through instead of failing the parse.
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true, no_binary_name = true)]
struct RawOptions {
    /// Show this message
    #[arg(short = 'h', long = "help")]
    help: bool,

    /// Path to configuration ini file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Everything clap did not recognize, in order.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

/// Parsed command line for a scaffolded application.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// `-h` / `--help` was given.
    pub help: bool,

    /// Value of `-c` / `--config`, if given.
    pub config: Option<PathBuf>,

    /// Unrecognized options from the options region. Option names map to
    /// their values; flags without a value map to empty strings.
    pub extras: BTreeMap<String, String>,

    /// Positional operands.
    pub arguments: Vec<String>,
}

/// Parses the command line, excluding the program name.
///
/// Malformed input, such as `--config` without its value, fails with
/// [`SoloistError::Argument`].
pub fn parse(args: &[String]) -> Result<AppOptions> {
    // A literal `--` ends the options region before clap ever looks, so
    // escaped operands never get mistaken for options.
    let (head, tail) = match args.iter().position(|a| a == "--") {
        Some(idx) => (&args[..idx], &args[idx + 1..]),
        None => (args, &[][..]),
    };
    let raw = RawOptions::try_parse_from(head).map_err(argument_error)?;
    let mut options = AppOptions {
        help: raw.help,
        config: raw.config,
        extras: BTreeMap::new(),
        arguments: Vec::new(),
    };
    split_rest(raw.rest, &mut options)?;
    options.arguments.extend(tail.iter().cloned());
    Ok(options)
}

/// Renders the usage text.
///
/// The format is fixed: option rows are aligned on the widest
/// ` -X, --long` column, one space, then the description.
pub fn usage(invocation: &str) -> String {
    let mut out = format!("Usage: {invocation} [OPTIONS] [ARGUMENTS]\n\nOptions:\n");
    let width = BUILTIN_OPTIONS
        .iter()
        .map(|(short, long, _)| format!(" -{short}, --{long}").len())
        .max()
        .unwrap_or(0);
    for (short, long, description) in BUILTIN_OPTIONS {
        let flags = format!(" -{short}, --{long}");
        out.push_str(&format!("{flags:<width$} {description}\n"));
    }
    out
}

fn argument_error(err: clap::Error) -> SoloistError {
    let raw = err.to_string();
    let message = raw
        .lines()
        .next()
        .unwrap_or("invalid arguments")
        .trim_start_matches("error: ");
    SoloistError::Argument(message.to_string())
}

/// Splits the scooped-up remainder into extras and positional arguments.
///
/// Clap stops matching declared options at the first token it does not
/// recognize, so a built-in option appearing after an unknown one also
/// ends up here and is folded back into its typed field.
fn split_rest(rest: Vec<String>, options: &mut AppOptions) -> Result<()> {
    let mut iter = rest.into_iter().peekable();
    while let Some(token) = iter.next() {
        if let Some(body) = token.strip_prefix("--").filter(|b| !b.is_empty()) {
            let (key, value) = match body.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => {
                    let value = match iter.peek() {
                        Some(next) if !next.starts_with('-') && !takes_no_value(body) => {
                            iter.next().unwrap_or_default()
                        }
                        _ => String::new(),
                    };
                    (body.to_string(), value)
                }
            };
            fold_back(options, &key, value)?;
        } else if let Some(body) = token
            .strip_prefix('-')
            .filter(|b| !b.is_empty() && !b.starts_with(|c: char| c.is_ascii_digit()))
        {
            if body.chars().count() == 1 {
                let value = match iter.peek() {
                    Some(next) if !next.starts_with('-') && !takes_no_value(body) => {
                        iter.next().unwrap_or_default()
                    }
                    _ => String::new(),
                };
                fold_back(options, body, value)?;
            } else {
                // A bundle of short flags carries no values.
                for c in body.chars() {
                    fold_back(options, &c.to_string(), String::new())?;
                }
            }
        } else {
            // First bare token ends the options region.
            options.arguments.push(token);
            options.arguments.extend(iter);
            break;
        }
    }
    Ok(())
}

fn takes_no_value(key: &str) -> bool {
    matches!(key, "h" | "help")
}

fn fold_back(options: &mut AppOptions, key: &str, value: String) -> Result<()> {
    match key {
        "h" | "help" => options.help = true,
        "c" | "config" => {
            if value.is_empty() {
                return Err(SoloistError::Argument(
                    "a value is required for '--config' but none was supplied".to_string(),
                ));
            }
            options.config = Some(PathBuf::from(value));
        }
        _ => {
            options.extras.insert(key.to_string(), value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_usage_message_is_byte_exact() {
        let expected = "Usage: my-console-app [OPTIONS] [ARGUMENTS]\n\n\
                        Options:\n \
                        -h, --help   Show this message\n \
                        -c, --config Path to configuration ini file\n";
        assert_eq!(usage("my-console-app"), expected);
    }

    #[test]
    fn test_empty_command_line() {
        let options = parse(&[]).unwrap();
        assert!(!options.help);
        assert!(options.config.is_none());
        assert!(options.extras.is_empty());
        assert!(options.arguments.is_empty());
    }

    #[test]
    fn test_help_flag() {
        assert!(parse(&args(&["-h"])).unwrap().help);
        assert!(parse(&args(&["--help"])).unwrap().help);
    }

    #[test]
    fn test_config_option_spellings() {
        for argv in [
            args(&["--config", "x.ini"]),
            args(&["-c", "x.ini"]),
            args(&["--config=x.ini"]),
        ] {
            let options = parse(&argv).unwrap();
            assert_eq!(options.config, Some(PathBuf::from("x.ini")));
        }
    }

    #[test]
    fn test_missing_config_value_is_argument_error() {
        let err = parse(&args(&["--config"])).unwrap_err();
        assert!(matches!(err, SoloistError::Argument(_)));
    }

    #[test]
    fn test_unknown_long_options_are_collected() {
        let options = parse(&args(&["--verbose", "--retries", "3", "--mode=fast"])).unwrap();
        assert_eq!(options.extras.get("verbose"), Some(&String::new()));
        assert_eq!(options.extras.get("retries"), Some(&"3".to_string()));
        assert_eq!(options.extras.get("mode"), Some(&"fast".to_string()));
    }

    #[test]
    fn test_unknown_short_options_are_collected() {
        let options = parse(&args(&["-v", "-n", "5"])).unwrap();
        assert_eq!(options.extras.get("v"), Some(&String::new()));
        assert_eq!(options.extras.get("n"), Some(&"5".to_string()));
    }

    #[test]
    fn test_short_flag_bundle() {
        let options = parse(&args(&["-xyz"])).unwrap();
        assert_eq!(options.extras.get("x"), Some(&String::new()));
        assert_eq!(options.extras.get("y"), Some(&String::new()));
        assert_eq!(options.extras.get("z"), Some(&String::new()));
    }

    #[test]
    fn test_positional_arguments() {
        let options = parse(&args(&["file1", "file2"])).unwrap();
        assert_eq!(options.arguments, vec!["file1", "file2"]);
    }

    #[test]
    fn test_bare_token_ends_options_region() {
        let options = parse(&args(&["--verbose", "--", "file1", "--not-an-option"])).unwrap();
        assert_eq!(options.extras.get("verbose"), Some(&String::new()));
        assert_eq!(options.arguments, vec!["file1", "--not-an-option"]);
    }

    #[test]
    fn test_unknown_option_takes_following_bare_token_as_value() {
        let options = parse(&args(&["--verbose", "input.txt"])).unwrap();
        assert_eq!(options.extras.get("verbose"), Some(&"input.txt".to_string()));
        assert!(options.arguments.is_empty());
    }

    #[test]
    fn test_builtin_option_after_unknown_is_still_recognized() {
        let options = parse(&args(&["--verbose", "--config", "x.ini", "-h"])).unwrap();
        assert_eq!(options.extras.get("verbose"), Some(&String::new()));
        assert_eq!(options.config, Some(PathBuf::from("x.ini")));
        assert!(options.help);
    }

    #[test]
    fn test_negative_number_is_positional() {
        let options = parse(&args(&["-5"])).unwrap();
        assert_eq!(options.arguments, vec!["-5"]);
    }

    #[test]
    fn test_mixed_command_line() {
        let options = parse(&args(&["-c", "app.json", "--dry-run", "job-1", "job-2"])).unwrap();
        assert_eq!(options.config, Some(PathBuf::from("app.json")));
        assert_eq!(options.extras.get("dry-run"), Some(&"job-1".to_string()));
        assert_eq!(options.arguments, vec!["job-2"]);
    }
}
