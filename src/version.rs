//! Suggest the next release version from commit messages.
//!
//! A current version of the form `[v]MAJOR.MINOR.PATCH` is bumped
//! according to the strongest signal found in the messages. Anything else
//! produces a date-stamped version for the local calendar day.
use chrono::{Local, NaiveDate};
use log::*;
use semver::Version as SemVer;

use crate::git::Commit;

const BREAKING_MARKERS: [&str; 2] = ["breaking", "!:"];
const FEATURE_MARKERS: [&str; 3] = ["feat", "feature", "add"];

/// Signals found across a set of commit messages. Both may be set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BumpSignals {
    pub breaking: bool,
    pub feature: bool,
}

impl BumpSignals {
    /// Case-insensitive substring scan of every message.
    pub fn scan(commits: &[Commit]) -> Self {
        commits.iter().fold(Self::default(), |mut signals, commit| {
            let message = commit.message.to_lowercase();
            signals.breaking |=
                BREAKING_MARKERS.iter().any(|m| message.contains(m));
            signals.feature |=
                FEATURE_MARKERS.iter().any(|m| message.contains(m));
            signals
        })
    }
}

/// Suggest a version using today's local date for the fallback.
pub fn suggest_version(commits: &[Commit], current: Option<&str>) -> String {
    suggest_version_on(commits, current, Local::now().date_naive())
}

/// Suggest a version with an explicit calendar date for the fallback.
pub fn suggest_version_on(
    commits: &[Commit],
    current: Option<&str>,
    today: NaiveDate,
) -> String {
    let Some(current) = current.and_then(parse_current) else {
        return today.format("v%Y.%m.%d").to_string();
    };

    let signals = BumpSignals::scan(commits);

    let Some(next) = bump(&current, signals) else {
        warn!("cannot bump v{current} without overflow: using date version");
        return today.format("v%Y.%m.%d").to_string();
    };

    debug!("suggesting v{next} from {signals:?}");

    format!("v{next}")
}

fn bump(current: &SemVer, signals: BumpSignals) -> Option<SemVer> {
    if signals.breaking {
        Some(SemVer::new(current.major.checked_add(1)?, 0, 0))
    } else if signals.feature {
        Some(SemVer::new(current.major, current.minor.checked_add(1)?, 0))
    } else {
        Some(SemVer::new(
            current.major,
            current.minor,
            current.patch.checked_add(1)?,
        ))
    }
}

/// Only plain `[v]N.N.N` is accepted; pre-release or build suffixes fall
/// through to the date-stamped version.
fn parse_current(raw: &str) -> Option<SemVer> {
    let parts = raw
        .trim_start_matches('v')
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;

    match parts.as_slice() {
        [major, minor, patch] => Some(SemVer::new(*major, *minor, *patch)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_commit;
    use regex::Regex;

    fn commits(messages: &[&str]) -> Vec<Commit> {
        messages
            .iter()
            .map(|m| create_test_commit("abc1234", m, &[]))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn no_current_version_uses_date_stamp() {
        let version = suggest_version(&[], None);
        let re = Regex::new(r"^v\d{4}\.\d{2}\.\d{2}$").unwrap();
        assert!(re.is_match(&version), "unexpected version {version}");
    }

    #[test]
    fn date_stamp_is_zero_padded() {
        assert_eq!(suggest_version_on(&[], None, today()), "v2024.03.07");
    }

    #[test]
    fn feature_bumps_minor() {
        let version =
            suggest_version_on(&commits(&["feat: add x"]), Some("v1.2.3"), today());
        assert_eq!(version, "v1.3.0");
    }

    #[test]
    fn breaking_bumps_major() {
        let version = suggest_version_on(
            &commits(&["breaking!: remove y"]),
            Some("v1.2.3"),
            today(),
        );
        assert_eq!(version, "v2.0.0");
    }

    #[test]
    fn breaking_wins_over_feature() {
        let version = suggest_version_on(
            &commits(&["feat: new thing", "refactor!: drop old api"]),
            Some("1.2.3"),
            today(),
        );
        assert_eq!(version, "v2.0.0");
    }

    #[test]
    fn other_changes_bump_patch() {
        let version = suggest_version_on(
            &commits(&["fix: crash on start", "chore: tidy"]),
            Some("1.2.3"),
            today(),
        );
        assert_eq!(version, "v1.2.4");
    }

    #[test]
    fn scan_is_case_insensitive() {
        let signals = BumpSignals::scan(&commits(&["BREAKING CHANGE: Feature gone"]));
        assert!(signals.breaking);
        assert!(signals.feature);
    }

    #[test]
    fn malformed_current_version_uses_date_stamp() {
        for current in ["1.2", "v1.2.3.4", "1.2.x", "1.2.3-rc.1", ""] {
            assert_eq!(
                suggest_version_on(&commits(&["feat: x"]), Some(current), today()),
                "v2024.03.07",
                "current {current:?}"
            );
        }
    }

    #[test]
    fn overflowing_bump_uses_date_stamp() {
        let max = u64::MAX;
        let cases = [
            ("fix: x", format!("1.2.{max}")),
            ("feat: x", format!("1.{max}.0")),
            ("breaking: x", format!("{max}.0.0")),
        ];

        for (message, current) in cases {
            assert_eq!(
                suggest_version_on(
                    &commits(&[message]),
                    Some(current.as_str()),
                    today()
                ),
                "v2024.03.07",
                "current {current}"
            );
        }
    }

    #[test]
    fn bump_below_the_limit_still_works() {
        let current = format!("1.2.{}", u64::MAX - 1);
        assert_eq!(
            suggest_version_on(
                &commits(&["fix: x"]),
                Some(current.as_str()),
                today()
            ),
            format!("v1.2.{}", u64::MAX)
        );
    }
}
