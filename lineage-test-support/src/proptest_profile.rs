//! Environment-driven proptest tuning shared by every property suite.

use std::env;

use proptest::test_runner::Config;

/// Environment variable overriding the number of cases per property.
pub const PROPTEST_CASES_ENV_KEY: &str = "PROPTEST_CASES";
/// Environment variable toggling forked proptest execution.
pub const LINEAGE_PBT_FORK_ENV_KEY: &str = "LINEAGE_PBT_FORK";

/// Case count and fork policy for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads a profile, falling back to the defaults for unset or invalid
    /// overrides.
    ///
    /// # Examples
    /// ```
    /// use lineage_test_support::proptest_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        let cases = read_env_or_default(PROPTEST_CASES_ENV_KEY, default_cases, parse_cases);
        let fork = read_env_or_default(LINEAGE_PBT_FORK_ENV_KEY, default_fork, parse_bool);
        Self { cases, fork }
    }

    /// Cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether cases run in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }

    /// Proptest configuration carrying this profile.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            cases: self.cases,
            fork: self.fork,
            ..Config::default()
        }
    }
}

/// Shorthand for `ProptestRunProfile::load(default_cases, false).config()`.
#[must_use]
pub fn suite_config(default_cases: u32) -> Config {
    ProptestRunProfile::load(default_cases, false).config()
}

fn read_env_or_default<T, F>(key: &'static str, default: T, parser: F) -> T
where
    T: Copy,
    F: Fn(&str) -> Result<T, String>,
{
    match env::var(key) {
        Ok(raw) => match parser(&raw) {
            Ok(value) => value,
            Err(reason) => {
                tracing::warn!(
                    env = key,
                    raw = %raw,
                    reason = %reason,
                    "invalid property-test profile override; using default",
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    let parsed = raw
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("parse error: {error}"))?;
    if parsed == 0 {
        return Err("cases must be > 0".to_owned());
    }
    Ok(parsed)
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected one of: true/false/1/0/yes/no/on/off".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Ok(1))]
    #[case(" 250 ", Ok(250))]
    #[case("0", Err(()))]
    #[case("-1", Err(()))]
    #[case("abc", Err(()))]
    fn case_overrides_must_be_positive(#[case] raw: &str, #[case] expected: Result<u32, ()>) {
        assert_eq!(parse_cases(raw).map_err(|_| ()), expected);
    }

    #[rstest]
    #[case("TRUE", Ok(true))]
    #[case("on", Ok(true))]
    #[case("0", Ok(false))]
    #[case("no", Ok(false))]
    #[case("", Err(()))]
    #[case("maybe", Err(()))]
    fn fork_overrides_accept_common_spellings(
        #[case] raw: &str,
        #[case] expected: Result<bool, ()>,
    ) {
        assert_eq!(parse_bool(raw).map_err(|_| ()), expected);
    }

    #[rstest]
    fn config_carries_profile() {
        let profile = ProptestRunProfile {
            cases: 12,
            fork: true,
        };
        let config = profile.config();
        assert_eq!(config.cases, 12);
        assert!(config.fork);
    }
}
