//! Property-test run profile shared by every proptest suite in the workspace.
//!
//! CI raises the case count for nightly jobs and may isolate cases in forked
//! processes; local runs fall back to the per-suite defaults.

use std::{env, fmt};

/// Overrides the number of cases per property.
pub const CASES_ENV_KEY: &str = "COMORBID_PROPTEST_CASES";
/// Runs each case in a forked subprocess when truthy.
pub const FORK_ENV_KEY: &str = "COMORBID_PBT_FORK";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the process environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use comorbid_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::load_from(|key| env::var(key).ok(), default_cases, default_fork)
    }

    /// Reads overrides through `lookup`; malformed values are logged and
    /// replaced by the defaults.
    #[must_use]
    pub fn load_from<F>(lookup: F, default_cases: u32, default_fork: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            cases: resolve(&lookup, CASES_ENV_KEY, default_cases, parse_cases),
            fork: resolve(&lookup, FORK_ENV_KEY, default_fork, parse_switch),
        }
    }

    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    NotANumber,
    Zero,
    NotASwitch,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotANumber => "expected a positive integer",
            Self::Zero => "case count must be positive",
            Self::NotASwitch => "expected one of true/false/1/0/yes/no/on/off",
        })
    }
}

fn resolve<T, F, P>(lookup: &F, key: &'static str, default: T, parse: P) -> T
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, Rejection>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|reason| {
        tracing::warn!(
            env = key,
            raw = %raw,
            %reason,
            "ignoring malformed property-test override",
        );
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, Rejection> {
    match raw.parse::<u32>() {
        Ok(0) => Err(Rejection::Zero),
        Ok(cases) => Ok(cases),
        Err(_) => Err(Rejection::NotANumber),
    }
}

fn parse_switch(raw: &str) -> Result<bool, Rejection> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Rejection::NotASwitch),
    }
}
