use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;
pub const MIN_TIME_HORIZON_YEARS: u32 = 1;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentExperience {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    /// Any value outside the questionnaire's options; scored with the default.
    #[serde(other)]
    Unrecognized,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
    #[serde(other)]
    Unrecognized,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentGoal {
    Retirement,
    Education,
    House,
    Business,
    WealthBuilding,
    EmergencyFund,
    #[serde(other)]
    Unrecognized,
}

/// Questionnaire answers for one assessment.
///
/// The scorer assumes `monthly_income > 0`; call [`FinancialProfile::validate`]
/// before handing a profile to [`crate::core::calculate_risk`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub total_savings: f64,
    pub total_debt: f64,
    pub investment_experience: InvestmentExperience,
    pub risk_tolerance: RiskTolerance,
    pub investment_goal: InvestmentGoal,
    pub time_horizon: u32,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("monthly income must be a finite number > 0")]
    NonPositiveIncome,
    #[error("{field} must be a finite number >= 0")]
    NegativeAmount { field: &'static str },
    #[error("{field} must be a whole number")]
    NotWholeNumber { field: &'static str },
    #[error("time horizon must be at least 1 year")]
    TimeHorizonTooShort,
    #[error("age must be between 18 and 100")]
    AgeOutOfRange,
    #[error("unsupported {field} value")]
    UnsupportedChoice { field: &'static str },
}

impl FinancialProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.monthly_income.is_finite() || self.monthly_income <= 0.0 {
            return Err(ProfileError::NonPositiveIncome);
        }

        for (field, amount) in [
            ("monthly expenses", self.monthly_expenses),
            ("total savings", self.total_savings),
            ("total debt", self.total_debt),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ProfileError::NegativeAmount { field });
            }
        }

        if self.time_horizon < MIN_TIME_HORIZON_YEARS {
            return Err(ProfileError::TimeHorizonTooShort);
        }

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(ProfileError::AgeOutOfRange);
        }

        if self.investment_experience == InvestmentExperience::Unrecognized {
            return Err(ProfileError::UnsupportedChoice {
                field: "investment experience",
            });
        }
        if self.risk_tolerance == RiskTolerance::Unrecognized {
            return Err(ProfileError::UnsupportedChoice {
                field: "risk tolerance",
            });
        }
        if self.investment_goal == InvestmentGoal::Unrecognized {
            return Err(ProfileError::UnsupportedChoice {
                field: "investment goal",
            });
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: &'static str,
    pub suggestion: &'static str,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDescription {
    pub score: i64,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioAssessment {
    /// Percentage, or `None` when the underlying ratio is not finite.
    pub ratio: Option<i64>,
    pub assessment: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub financial_stability: ScoredDescription,
    pub debt_to_income_ratio: RatioAssessment,
    pub emergency_fund_ratio: RatioAssessment,
    pub risk_capacity: ScoredDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub risk_percentage: u32,
    pub recommendations: Vec<Recommendation>,
    pub detailed_analysis: DetailedAnalysis,
}
