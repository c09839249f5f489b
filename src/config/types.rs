//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Metadata about the organisation running payroll.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganisationMetadata {
    /// The organisation's display name.
    pub name: String,
    /// ISO currency code salaries are paid in.
    pub currency: String,
    /// The version or effective date of the payroll policy.
    pub version: String,
}

/// One step of the earned-leave step function.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeaveTier {
    /// Present days required to reach this tier.
    pub min_present_days: Decimal,
    /// Paid leaves earned at this tier.
    pub leaves: u32,
}

/// Business rules applied by the salary pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayrollPolicy {
    /// Earned-leave tiers, evaluated highest threshold first.
    #[serde(default = "default_leave_tiers")]
    pub leave_tiers: Vec<LeaveTier>,
    /// Fraction of a present day a half day counts for.
    #[serde(default = "default_half_day_weight")]
    pub half_day_weight: Decimal,
    /// Extra fraction of a day paid for an overtime day.
    #[serde(default = "default_overtime_premium")]
    pub overtime_premium: Decimal,
    /// Whether the referred hire must still be active for the bonus to pay.
    #[serde(default = "default_true")]
    pub referral_requires_active_referred: bool,
}

fn default_leave_tiers() -> Vec<LeaveTier> {
    vec![
        LeaveTier {
            min_present_days: Decimal::new(25, 0),
            leaves: 2,
        },
        LeaveTier {
            min_present_days: Decimal::new(15, 0),
            leaves: 1,
        },
    ]
}

fn default_half_day_weight() -> Decimal {
    Decimal::new(5, 1)
}

fn default_overtime_premium() -> Decimal {
    Decimal::new(5, 1)
}

fn default_true() -> bool {
    true
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            leave_tiers: default_leave_tiers(),
            half_day_weight: default_half_day_weight(),
            overtime_premium: default_overtime_premium(),
            referral_requires_active_referred: true,
        }
    }
}

impl PayrollPolicy {
    /// Checks the policy for internal consistency.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.half_day_weight <= Decimal::ZERO || self.half_day_weight > Decimal::ONE {
            return Err(format!(
                "half_day_weight {} must be in (0, 1]",
                self.half_day_weight
            ));
        }
        if self.overtime_premium < Decimal::ZERO {
            return Err(format!(
                "overtime_premium {} must not be negative",
                self.overtime_premium
            ));
        }
        for (i, tier) in self.leave_tiers.iter().enumerate() {
            if tier.min_present_days < Decimal::ZERO {
                return Err(format!(
                    "leave tier min_present_days {} must not be negative",
                    tier.min_present_days
                ));
            }
            if self.leave_tiers[..i]
                .iter()
                .any(|t| t.min_present_days == tier.min_present_days)
            {
                return Err(format!(
                    "duplicate leave tier threshold {}",
                    tier.min_present_days
                ));
            }
        }
        Ok(())
    }

    /// Orders leave tiers from the highest threshold down.
    pub fn normalized(mut self) -> Self {
        self.leave_tiers
            .sort_by(|a, b| b.min_present_days.cmp(&a.min_present_days));
        self
    }
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// Organisation metadata.
    metadata: OrganisationMetadata,
    /// Payroll business rules.
    policy: PayrollPolicy,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(metadata: OrganisationMetadata, policy: PayrollPolicy) -> Self {
        Self {
            metadata,
            policy: policy.normalized(),
        }
    }

    /// Returns the organisation metadata.
    pub fn organisation(&self) -> &OrganisationMetadata {
        &self.metadata
    }

    /// Returns the payroll policy.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_policy_matches_house_rules() {
        let policy = PayrollPolicy::default();
        assert_eq!(policy.half_day_weight, dec("0.5"));
        assert_eq!(policy.overtime_premium, dec("0.5"));
        assert_eq!(policy.leave_tiers.len(), 2);
        assert_eq!(policy.leave_tiers[0].min_present_days, dec("25"));
        assert_eq!(policy.leave_tiers[0].leaves, 2);
        assert!(policy.check().is_ok());
    }

    #[test]
    fn test_policy_yaml_uses_defaults_for_missing_fields() {
        let policy: PayrollPolicy = serde_yaml::from_str("overtime_premium: \"1.0\"").unwrap();
        assert_eq!(policy.overtime_premium, dec("1.0"));
        assert_eq!(policy.half_day_weight, dec("0.5"));
        assert_eq!(policy.leave_tiers, default_leave_tiers());
    }

    #[test]
    fn test_check_rejects_zero_half_day_weight() {
        let policy = PayrollPolicy {
            half_day_weight: Decimal::ZERO,
            ..PayrollPolicy::default()
        };
        assert!(policy.check().unwrap_err().contains("half_day_weight"));
    }

    #[test]
    fn test_check_rejects_duplicate_thresholds() {
        let policy = PayrollPolicy {
            leave_tiers: vec![
                LeaveTier {
                    min_present_days: dec("20"),
                    leaves: 1,
                },
                LeaveTier {
                    min_present_days: dec("20"),
                    leaves: 2,
                },
            ],
            ..PayrollPolicy::default()
        };
        assert!(policy.check().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_normalized_sorts_tiers_descending() {
        let policy = PayrollPolicy {
            leave_tiers: vec![
                LeaveTier {
                    min_present_days: dec("15"),
                    leaves: 1,
                },
                LeaveTier {
                    min_present_days: dec("25"),
                    leaves: 2,
                },
            ],
            ..PayrollPolicy::default()
        }
        .normalized();
        assert_eq!(policy.leave_tiers[0].min_present_days, dec("25"));
    }
}
