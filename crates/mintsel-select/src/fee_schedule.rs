//! Wire fee schedule resolution.
//!
//! An exchange publishes, per wire method, a timeline of signed fee entries,
//! each valid on a half-open interval `[start, end)`. Resolution picks the
//! entry that applies at an instant. Published timelines are supposed to be
//! gap- and overlap-free; when they are not, resolution stays deterministic
//! and reports what it saw.

use std::cmp::Reverse;

use mintsel_types::{MintselError, Result, Timestamp, VerificationStatus, WireFeeEntry};
use tracing::warn;

/// Non-fatal findings attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleWarning {
    /// More than one verified entry covered the instant.
    OverlapDetected {
        method: String,
        at: Timestamp,
        candidates: usize,
    },
}

/// The fee entry in force at an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFee {
    pub entry: WireFeeEntry,
    /// Position of `entry` in the input slice.
    pub index: usize,
    pub warnings: Vec<ScheduleWarning>,
}

/// Find the verified entry for `method` whose interval contains `at`.
///
/// Among several candidates the latest `start_stamp` wins, then the earliest
/// `end_stamp`, then the lowest input index.
///
/// # Errors
/// `NoApplicableFee` if no verified entry covers `at`.
pub fn resolve(entries: &[WireFeeEntry], method: &str, at: Timestamp) -> Result<ResolvedFee> {
    let candidates: Vec<(usize, &WireFeeEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.wire_method == method
                && e.verification_status == VerificationStatus::Verified
                && e.covers(at)
        })
        .collect();

    let Some(&(index, entry)) = candidates
        .iter()
        .min_by_key(|(i, e)| (Reverse(e.start_stamp), e.end_stamp, *i))
    else {
        return Err(MintselError::NoApplicableFee {
            method: method.to_string(),
            at,
        });
    };

    let mut warnings = Vec::new();
    if candidates.len() > 1 {
        warn!(
            method,
            at = %at,
            candidates = candidates.len(),
            chosen_start = %entry.start_stamp,
            "overlapping wire fee entries"
        );
        warnings.push(ScheduleWarning::OverlapDetected {
            method: method.to_string(),
            at,
            candidates: candidates.len(),
        });
    }

    Ok(ResolvedFee {
        entry: entry.clone(),
        index,
        warnings,
    })
}

/// A `[start, end)` interval of a fee entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl From<&WireFeeEntry> for Span {
    fn from(e: &WireFeeEntry) -> Self {
        Self {
            start: e.start_stamp,
            end: e.end_stamp,
        }
    }
}

/// A defect in a method's fee timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleIssue {
    /// Two entries cover a common instant.
    Overlap { earlier: Span, later: Span },
    /// No entry covers `[from, to)`.
    Gap { from: Timestamp, to: Timestamp },
}

/// List every overlap and gap in the verified timeline of `method`,
/// in chronological order. Time before the first entry and after the last
/// one is not reported.
#[must_use]
pub fn audit_schedule(entries: &[WireFeeEntry], method: &str) -> Vec<ScheduleIssue> {
    let mut spans: Vec<Span> = entries
        .iter()
        .filter(|e| e.wire_method == method && e.verification_status == VerificationStatus::Verified)
        .map(Span::from)
        .collect();
    spans.sort_by_key(|s| (s.start, s.end));

    let mut issues = Vec::new();
    let mut reach: Option<Span> = None;
    for span in spans {
        match reach {
            None => reach = Some(span),
            Some(prev) => {
                if span.start < prev.end {
                    issues.push(ScheduleIssue::Overlap {
                        earlier: prev,
                        later: span,
                    });
                } else if span.start > prev.end {
                    issues.push(ScheduleIssue::Gap {
                        from: prev.end,
                        to: span.start,
                    });
                }
                if span.end > prev.end {
                    reach = Some(span);
                }
            }
        }
    }
    issues
}
