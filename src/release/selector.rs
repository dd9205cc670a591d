//! Feed-order release selection

use tracing::debug;

use crate::release::channel::{ChannelLevel, is_acceptable};
use crate::release::tag;
use crate::release::types::Release;

/// Pick the first release in feed order that the channel policy accepts
///
/// `releases` must already be ordered newest-first. The scan is recency-first:
/// an older entry with a higher numeric core never wins over an earlier match.
pub fn select_latest(releases: &[Release], minimum: ChannelLevel) -> Option<&Release> {
    releases.iter().find(|release| {
        let parsed = tag::parse(&release.raw_name);
        let acceptable = is_acceptable(parsed.pre_release_tag.as_deref(), minimum);
        if !acceptable {
            debug!("Skipping {} below {} channel", release.raw_name, minimum);
        }
        acceptable
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn releases(names: &[&str]) -> Vec<Release> {
        names
            .iter()
            .map(|name| {
                Release::new(
                    *name,
                    *name,
                    format!("https://example.com/{}.zip", name),
                )
            })
            .collect()
    }

    #[rstest]
    #[case(&["2.0.0-alpha1", "1.9.0"], ChannelLevel::Beta, Some("1.9.0"))]
    #[case(&["2.0.0-beta1", "1.9.0"], ChannelLevel::Beta, Some("2.0.0-beta1"))]
    #[case(&["2.0.0-beta1", "1.9.0"], ChannelLevel::Production, Some("1.9.0"))]
    #[case(&["2.0.0-dev4", "2.0.0-alpha1"], ChannelLevel::Dev, Some("2.0.0-dev4"))]
    #[case(&["2.0.0-rc1", "1.9.0"], ChannelLevel::Production, Some("2.0.0-rc1"))]
    #[case(&["2.0.0-nightly5", "1.9.0"], ChannelLevel::Production, Some("2.0.0-nightly5"))]
    #[case(&["2.0.0-alpha1", "2.0.0-dev1"], ChannelLevel::Beta, None)]
    #[case(&[], ChannelLevel::Dev, None)]
    fn select_latest_returns_first_acceptable(
        #[case] names: &[&str],
        #[case] minimum: ChannelLevel,
        #[case] expected: Option<&str>,
    ) {
        let feed = releases(names);
        assert_eq!(
            select_latest(&feed, minimum).map(|r| r.raw_name.as_str()),
            expected
        );
    }

    #[test]
    fn select_latest_keeps_feed_order_over_version_order() {
        let feed = releases(&["1.0.1", "3.0.0"]);

        assert_eq!(
            select_latest(&feed, ChannelLevel::Production).map(|r| r.raw_name.as_str()),
            Some("1.0.1")
        );
    }
}
