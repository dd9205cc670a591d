//! Update decision for a selected release

use std::cmp::Ordering;

use tracing::debug;

use crate::release::tag::{self, ParsedVersion, normalized_version_string};
use crate::release::types::{Release, ReleaseDecision};

/// Compare two version strings
///
/// Numeric cores are compared component-wise with missing components read as
/// zero. On equal cores a recognized marker sorts below no marker; two markers
/// sort by kind (`dev < alpha < beta < rc < p`) and then by patch number.
/// When either side has no numeric core, the normalized strings are compared
/// lexically.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let lhs = tag::parse(left);
    let rhs = tag::parse(right);

    if lhs.numeric_core.is_empty() || rhs.numeric_core.is_empty() {
        return normalized_version_string(left).cmp(&normalized_version_string(right));
    }

    compare_cores(&lhs.numeric_core, &rhs.numeric_core).then_with(|| compare_markers(&lhs, &rhs))
}

fn compare_cores(lhs: &[u64], rhs: &[u64]) -> Ordering {
    let len = lhs.len().max(rhs.len());
    (0..len)
        .map(|i| {
            let a = lhs.get(i).copied().unwrap_or(0);
            let b = rhs.get(i).copied().unwrap_or(0);
            a.cmp(&b)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_markers(lhs: &ParsedVersion, rhs: &ParsedVersion) -> Ordering {
    match (lhs.marker(), rhs.marker()) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b).then_with(|| {
            lhs.pre_release_patch
                .unwrap_or(0)
                .cmp(&rhs.pre_release_patch.unwrap_or(0))
        }),
    }
}

/// Build the decision for `selected` against the installed version
pub fn decide(selected: Option<&Release>, installed_version: &str) -> ReleaseDecision {
    let Some(release) = selected else {
        return ReleaseDecision::default();
    };

    let candidate = normalized_version_string(&release.raw_name);
    let update_available = compare_versions(&candidate, installed_version) == Ordering::Greater;

    debug!(
        "Candidate {} vs installed {}: update_available={}",
        candidate, installed_version, update_available
    );

    ReleaseDecision {
        selected_release: Some(release.clone()),
        update_available,
        target_version: Some(candidate),
        download_reference: Some(release.artifact_url.clone()),
    }
}
