//! Application name derivation.
//!
//! The lifecycle takes an explicit identity string (typically the concrete
//! application's type name) and derives the canonical dash-delimited name
//! used for the default config, lock, and log file names and in the
//! start/stop log messages.

/// Derives the canonical application name from a compound identifier.
///
/// Splits on underscores and camel-case humps, lowercases each segment,
/// and joins with hyphens. `"MyConsoleApp"` and `"My_Console_App"` both
/// yield `"my-console-app"`; acronym runs stay together, so
/// `"HTTPServer"` yields `"http-server"`.
pub fn derive_app_name(identity: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    for part in identity.split('_').filter(|p| !p.is_empty()) {
        split_camel_humps(part, &mut segments);
    }
    segments.join("-")
}

fn split_camel_humps(part: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = part.chars().collect();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && !current.is_empty() {
            let after_lower = chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit();
            // The last capital of an acronym run starts a new word when a
            // lowercase letter follows it.
            let acronym_end = chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if after_lower || acronym_end {
                out.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_identity_becomes_kebab_case() {
        assert_eq!(derive_app_name("MyConsoleApp"), "my-console-app");
    }

    #[test]
    fn underscore_identity_becomes_kebab_case() {
        assert_eq!(derive_app_name("My_Console_App"), "my-console-app");
    }

    #[test]
    fn single_word_is_lowercased() {
        assert_eq!(derive_app_name("Sync"), "sync");
        assert_eq!(derive_app_name("sync"), "sync");
    }

    #[test]
    fn acronym_run_stays_together() {
        assert_eq!(derive_app_name("HTTPServer"), "http-server");
        assert_eq!(derive_app_name("ParseXML"), "parse-xml");
    }

    #[test]
    fn mixed_underscores_and_humps() {
        assert_eq!(derive_app_name("Beacon_SyncWorker"), "beacon-sync-worker");
    }

    #[test]
    fn digits_bind_to_the_preceding_segment() {
        assert_eq!(derive_app_name("App2Cli"), "app2-cli");
        assert_eq!(derive_app_name("SyncV2"), "sync-v2");
    }

    #[test]
    fn empty_segments_are_skipped() {
        assert_eq!(derive_app_name("My__App"), "my-app");
        assert_eq!(derive_app_name("_Leading"), "leading");
        assert_eq!(derive_app_name(""), "");
    }
}
