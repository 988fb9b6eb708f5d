//! Comparing two runtime snapshots: checklist progress and final losses.

use std::fmt;

use serde::Serialize;

use crate::overlay::ChecklistSummary;
use crate::status::RuntimeStatus;

/// Training streams whose final validation loss is compared.
pub const COMPARED_STREAMS: [&str; 2] = ["patchtst", "swinmae"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaTag {
    Improved,
    Regressed,
    Neutral,
    /// One of the snapshots is missing.
    NotApplicable,
}

impl DeltaTag {
    pub fn as_str(self) -> &'static str {
        match self {
            DeltaTag::Improved => "improved",
            DeltaTag::Regressed => "regressed",
            DeltaTag::Neutral => "neutral",
            DeltaTag::NotApplicable => "n/a",
        }
    }

    /// Lower is better.
    pub fn for_loss(delta: Option<f64>) -> Self {
        match delta {
            Some(d) if d < 0.0 => DeltaTag::Improved,
            Some(d) if d > 0.0 => DeltaTag::Regressed,
            _ => DeltaTag::Neutral,
        }
    }

    /// Higher is better.
    pub fn for_pass_count(delta: i64) -> Self {
        match delta.signum() {
            1 => DeltaTag::Improved,
            -1 => DeltaTag::Regressed,
            _ => DeltaTag::Neutral,
        }
    }
}

impl fmt::Display for DeltaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassDelta {
    pub current: ChecklistSummary,
    pub baseline: ChecklistSummary,
    pub delta: i64,
    pub tag: DeltaTag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossDelta {
    pub stream: String,
    pub current: Option<f64>,
    pub baseline: Option<f64>,
    pub delta: Option<f64>,
    pub tag: DeltaTag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaSummary {
    /// `None` when either snapshot is missing.
    pub checklist: Option<PassDelta>,
    pub losses: Vec<LossDelta>,
}

impl DeltaSummary {
    /// Every row "n/a".
    pub fn not_applicable() -> Self {
        Self {
            checklist: None,
            losses: COMPARED_STREAMS
                .iter()
                .map(|s| LossDelta {
                    stream: (*s).to_string(),
                    current: None,
                    baseline: None,
                    delta: None,
                    tag: DeltaTag::NotApplicable,
                })
                .collect(),
        }
    }

    pub fn checklist_tag(&self) -> DeltaTag {
        self.checklist
            .map(|c| c.tag)
            .unwrap_or(DeltaTag::NotApplicable)
    }

    pub fn loss(&self, stream: &str) -> Option<&LossDelta> {
        self.losses.iter().find(|l| l.stream == stream)
    }

    /// Human readable rows, e.g. for the CLI or a summary panel.
    pub fn rows(&self) -> Vec<(String, String, DeltaTag)> {
        let mut rows = Vec::with_capacity(1 + self.losses.len());
        match &self.checklist {
            Some(c) => rows.push((
                "checklist passed".to_string(),
                format!(
                    "{} ({}/{} vs {}/{})",
                    format_signed_int(c.delta),
                    c.current.passed,
                    c.current.total,
                    c.baseline.passed,
                    c.baseline.total
                ),
                c.tag,
            )),
            None => rows.push((
                "checklist passed".to_string(),
                "n/a".to_string(),
                DeltaTag::NotApplicable,
            )),
        }
        for l in &self.losses {
            rows.push((
                format!("{} final val_loss", l.stream),
                format_signed_float(l.delta, 4),
                l.tag,
            ));
        }
        rows
    }
}

pub fn count_passed(status: &RuntimeStatus) -> ChecklistSummary {
    ChecklistSummary::of(&status.checklist)
}

/// The last finite `val_loss` of a stream, scanning from the end of the series.
pub fn last_finite_val_loss(status: &RuntimeStatus, stream: &str) -> Option<f64> {
    status
        .loss_series(stream)
        .iter()
        .rev()
        .find_map(|p| p.val_loss.filter(|v| v.is_finite()))
}

/// Compare `current` against `baseline`. Missing either side gives all "n/a".
pub fn compare(current: Option<&RuntimeStatus>, baseline: Option<&RuntimeStatus>) -> DeltaSummary {
    let (Some(current), Some(baseline)) = (current, baseline) else {
        return DeltaSummary::not_applicable();
    };

    let cur = count_passed(current);
    let base = count_passed(baseline);
    let delta = cur.passed as i64 - base.passed as i64;
    let checklist = PassDelta {
        current: cur,
        baseline: base,
        delta,
        tag: DeltaTag::for_pass_count(delta),
    };

    let losses = COMPARED_STREAMS
        .iter()
        .map(|stream| {
            let c = last_finite_val_loss(current, stream);
            let b = last_finite_val_loss(baseline, stream);
            let delta = match (c, b) {
                (Some(c), Some(b)) => Some(c - b),
                _ => None,
            };
            LossDelta {
                stream: (*stream).to_string(),
                current: c,
                baseline: b,
                delta,
                tag: DeltaTag::for_loss(delta),
            }
        })
        .collect();

    DeltaSummary {
        checklist: Some(checklist),
        losses,
    }
}

pub fn format_signed_int(v: i64) -> String {
    if v > 0 { format!("+{v}") } else { v.to_string() }
}

pub fn format_signed_float(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(v) if v > 0.0 => format!("+{v:.precision$}"),
        Some(v) => format!("{v:.precision$}"),
        None => "n/a".to_string(),
    }
}
