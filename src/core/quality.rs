//! Guide quality audit
//!
//! Scores a parsed guide against a fixed set of structural checks. The score
//! is the percentage of checks that pass; a guide passes at 95% or more.

use crate::core::format::guide::{BlockKind, Guide};
use serde::{Deserialize, Serialize};

/// Score at or above which a guide passes the audit
pub const PASSING_THRESHOLD: f64 = 95.0;

/// Minimum number of words for a complete guide
pub const MIN_WORD_COUNT: usize = 250;

/// Result of one audit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of auditing one guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Percentage of checks passed (0-100)
    pub score: f64,
    pub checks: Vec<QualityCheck>,
}

impl QualityReport {
    /// Returns true if the score meets [`PASSING_THRESHOLD`]
    pub fn passed(&self) -> bool {
        self.score >= PASSING_THRESHOLD
    }

    /// Checks that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &QualityCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Audits a parsed guide
pub fn audit_guide(guide: &Guide) -> QualityReport {
    let checks = vec![
        check(
            "quick_glance",
            guide.has_block(BlockKind::QuickGlance),
            "missing [QUICK_GLANCE] section",
        ),
        check(
            "takeaways",
            guide.has_block(BlockKind::Takeaways),
            "missing [TAKEAWAYS] section",
        ),
        heading_structure(guide),
        QualityCheck {
            name: "closed_blocks".to_string(),
            passed: guide.issues.is_empty(),
            detail: guide.issues.first().map(ToString::to_string),
        },
        check(
            "word_count",
            guide.word_count >= MIN_WORD_COUNT,
            &format!(
                "{} words, expected at least {MIN_WORD_COUNT}",
                guide.word_count
            ),
        ),
    ];

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = (passed as f64 / checks.len() as f64 * 1000.0).round() / 10.0;

    QualityReport { score, checks }
}

fn check(name: &str, passed: bool, failure: &str) -> QualityCheck {
    QualityCheck {
        name: name.to_string(),
        passed,
        detail: (!passed).then(|| failure.to_string()),
    }
}

/// A guide needs headings, and nesting may deepen one level at a time
fn heading_structure(guide: &Guide) -> QualityCheck {
    let levels: Vec<u8> = guide.headings().map(|(level, _)| level).collect();
    if levels.is_empty() {
        return check("heading_structure", false, "no headings");
    }

    let skipped = levels
        .windows(2)
        .find(|pair| pair[1] > pair[0] + 1)
        .map(|pair| format!("heading level jumps from {} to {}", pair[0], pair[1]));

    QualityCheck {
        name: "heading_structure".to_string(),
        passed: skipped.is_none(),
        detail: skipped,
    }
}
