//! Tiered audit escalation for settlement orders.
//!
//! An order of amount `A` must be approved by every configured level whose
//! `min_amount <= A`, lowest level first. Approval is strictly sequential and
//! a single rejection at any required level rejects the whole order.

use crate::error::{LifecycleError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A tier of auditor privilege. Level 0 means "nothing approved yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLevel(u8);

impl AuditLevel {
    pub const NONE: Self = Self(0);

    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditThreshold {
    pub level: AuditLevel,
    pub min_amount: Decimal,
}

impl AuditThreshold {
    pub fn new(level: u8, min_amount: Decimal) -> Self {
        Self {
            level: AuditLevel::new(level),
            min_amount,
        }
    }
}

/// Validated `{level, min_amount}` table, maintained by admins elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AuditThreshold>", into = "Vec<AuditThreshold>")]
pub struct ThresholdTable {
    thresholds: Vec<AuditThreshold>,
}

impl ThresholdTable {
    /// Levels must be at least 1 and unique; minimum amounts must be non-negative.
    pub fn new(thresholds: Vec<AuditThreshold>) -> Result<Self> {
        let mut seen = HashSet::new();
        for threshold in &thresholds {
            if threshold.level == AuditLevel::NONE {
                return Err(LifecycleError::ValidationError(
                    "audit levels start at 1".to_string(),
                ));
            }
            if threshold.min_amount < Decimal::ZERO {
                return Err(LifecycleError::ValidationError(format!(
                    "minimum amount for {} must not be negative",
                    threshold.level
                )));
            }
            if !seen.insert(threshold.level) {
                return Err(LifecycleError::ValidationError(format!(
                    "audit level {} configured twice",
                    threshold.level
                )));
            }
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[AuditThreshold] {
        &self.thresholds
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            thresholds: vec![
                AuditThreshold::new(1, dec!(0)),
                AuditThreshold::new(2, dec!(10000)),
                AuditThreshold::new(3, dec!(50000)),
            ],
        }
    }
}

impl TryFrom<Vec<AuditThreshold>> for ThresholdTable {
    type Error = LifecycleError;

    fn try_from(thresholds: Vec<AuditThreshold>) -> Result<Self> {
        Self::new(thresholds)
    }
}

impl From<ThresholdTable> for Vec<AuditThreshold> {
    fn from(table: ThresholdTable) -> Self {
        table.thresholds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    Approve,
    Reject,
}

impl fmt::Display for AuditDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("APPROVE"),
            Self::Reject => f.write_str("REJECT"),
        }
    }
}

/// Levels whose threshold applies to `amount`, ascending.
pub fn required_levels(amount: Decimal, table: &ThresholdTable) -> Result<Vec<AuditLevel>> {
    let mut levels: Vec<AuditLevel> = table
        .thresholds
        .iter()
        .filter(|t| t.min_amount <= amount)
        .map(|t| t.level)
        .collect();
    levels.sort();

    if levels.is_empty() {
        Err(LifecycleError::NoApplicableAuditLevel { amount })
    } else {
        Ok(levels)
    }
}

/// Audit state of one settlement order.
///
/// The required sequence is fixed when the order is created and only
/// replaced by an explicit recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditProgress {
    required: Vec<AuditLevel>,
    highest_approved: AuditLevel,
    rejected_at: Option<AuditLevel>,
}

impl AuditProgress {
    pub fn new(mut required: Vec<AuditLevel>) -> Self {
        required.sort();
        required.dedup();
        Self {
            required,
            highest_approved: AuditLevel::NONE,
            rejected_at: None,
        }
    }

    pub fn for_amount(amount: Decimal, table: &ThresholdTable) -> Result<Self> {
        required_levels(amount, table).map(Self::new)
    }

    pub fn required(&self) -> &[AuditLevel] {
        &self.required
    }

    pub fn highest_approved(&self) -> AuditLevel {
        self.highest_approved
    }

    pub fn rejected_at(&self) -> Option<AuditLevel> {
        self.rejected_at
    }

    pub fn has_approvals(&self) -> bool {
        self.highest_approved > AuditLevel::NONE
    }

    /// `None` once every level approved, or after a rejection.
    pub fn next_expected_level(&self) -> Option<AuditLevel> {
        if self.rejected_at.is_some() {
            return None;
        }
        self.required
            .iter()
            .copied()
            .find(|level| *level > self.highest_approved)
    }

    pub fn is_fully_approved(&self) -> bool {
        self.rejected_at.is_none() && self.next_expected_level().is_none()
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected_at.is_some()
    }

    /// Applies one level's decision, returning the new progress.
    pub fn record_decision(&self, level: AuditLevel, decision: AuditDecision) -> Result<Self> {
        let expected = self.next_expected_level();
        if expected != Some(level) {
            return Err(LifecycleError::OutOfOrderAudit {
                expected,
                got: level,
            });
        }

        let mut next = self.clone();
        match decision {
            AuditDecision::Approve => next.highest_approved = level,
            AuditDecision::Reject => next.rejected_at = Some(level),
        }
        Ok(next)
    }
}
