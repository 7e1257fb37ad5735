use tracing::debug;

use super::advice::{build_detailed_analysis, build_recommendations};
use super::types::{
    FinancialProfile, InvestmentExperience, InvestmentGoal, RiskLevel, RiskResult, RiskTolerance,
};

const STABILITY_WEIGHT: f64 = 0.35;
const EXPERIENCE_WEIGHT: f64 = 0.20;
const TOLERANCE_WEIGHT: f64 = 0.20;
const GOAL_WEIGHT: f64 = 0.15;
const AGE_WEIGHT: f64 = 0.10;

const STABILITY_BASE: i64 = 50;
const DEFAULT_EXPERIENCE_SCORE: i64 = 25;
const DEFAULT_TOLERANCE_SCORE: i64 = 30;
const DEFAULT_GOAL_BASE_SCORE: i64 = 50;

pub(crate) const HIGH_RISK_FLOOR: u32 = 70;
pub(crate) const MEDIUM_RISK_FLOOR: u32 = 40;

/// Per-factor sub-scores, each already clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentScores {
    pub financial_stability: i64,
    pub experience: i64,
    pub tolerance: i64,
    pub goal: i64,
    pub age: i64,
}

impl ComponentScores {
    pub fn for_profile(profile: &FinancialProfile) -> Self {
        Self {
            financial_stability: financial_stability_score(
                profile.monthly_income,
                profile.monthly_expenses,
                profile.total_savings,
                profile.total_debt,
            ),
            experience: experience_score(profile.investment_experience),
            tolerance: tolerance_score(profile.risk_tolerance),
            goal: goal_score(profile.investment_goal, profile.time_horizon),
            age: age_score(profile.age),
        }
    }

    pub fn weighted_total(self) -> f64 {
        self.financial_stability as f64 * STABILITY_WEIGHT
            + self.experience as f64 * EXPERIENCE_WEIGHT
            + self.tolerance as f64 * TOLERANCE_WEIGHT
            + self.goal as f64 * GOAL_WEIGHT
            + self.age as f64 * AGE_WEIGHT
    }
}

/// Scores one questionnaire.
///
/// `profile.monthly_income` must be > 0; everything else is scored as given,
/// with unrecognized choices falling back to their default scores.
pub fn calculate_risk(profile: &FinancialProfile) -> RiskResult {
    let components = ComponentScores::for_profile(profile);
    let overall = components.weighted_total();
    let risk_score = rounded_score(overall);

    debug!(
        stability = components.financial_stability,
        experience = components.experience,
        tolerance = components.tolerance,
        goal = components.goal,
        age = components.age,
        overall,
        "scored financial profile"
    );

    RiskResult {
        risk_score,
        risk_level: risk_level(risk_score),
        risk_percentage: risk_percentage(overall),
        recommendations: build_recommendations(profile, overall),
        detailed_analysis: build_detailed_analysis(profile, components.financial_stability),
    }
}

pub(crate) fn financial_stability_score(
    income: f64,
    expenses: f64,
    savings: f64,
    debt: f64,
) -> i64 {
    let disposable_income = income - expenses;
    let debt_to_income = debt / income;
    let savings_to_income = savings / income;
    let emergency_fund_ratio = savings / (expenses * 6.0);

    let mut score = STABILITY_BASE;

    if disposable_income > income * 0.30 {
        score += 20;
    } else if disposable_income > income * 0.15 {
        score += 10;
    } else if disposable_income < 0.0 {
        score -= 30;
    }

    if debt_to_income > 0.5 {
        score -= 25;
    } else if debt_to_income > 0.3 {
        score -= 15;
    } else if debt_to_income < 0.1 {
        score += 15;
    }

    if savings_to_income > 0.5 {
        score += 20;
    } else if savings_to_income > 0.2 {
        score += 10;
    } else if savings_to_income < 0.05 {
        score -= 15;
    }

    // 0/0 is NaN and lands in the penalty branch.
    if emergency_fund_ratio >= 1.0 {
        score += 15;
    } else if emergency_fund_ratio >= 0.5 {
        score += 5;
    } else {
        score -= 10;
    }

    score.clamp(0, 100)
}

pub(crate) fn experience_score(experience: InvestmentExperience) -> i64 {
    match experience {
        InvestmentExperience::Beginner => 25,
        InvestmentExperience::Intermediate => 50,
        InvestmentExperience::Advanced => 75,
        InvestmentExperience::Expert => 90,
        InvestmentExperience::Unrecognized => DEFAULT_EXPERIENCE_SCORE,
    }
}

pub(crate) fn tolerance_score(tolerance: RiskTolerance) -> i64 {
    match tolerance {
        RiskTolerance::Conservative => 30,
        RiskTolerance::Moderate => 60,
        RiskTolerance::Aggressive => 85,
        RiskTolerance::Unrecognized => DEFAULT_TOLERANCE_SCORE,
    }
}

pub(crate) fn goal_score(goal: InvestmentGoal, time_horizon: u32) -> i64 {
    let mut score = match goal {
        InvestmentGoal::EmergencyFund => 20,
        InvestmentGoal::Education => 40,
        InvestmentGoal::House => 50,
        InvestmentGoal::Retirement => 70,
        InvestmentGoal::Business => 80,
        InvestmentGoal::WealthBuilding => 75,
        InvestmentGoal::Unrecognized => DEFAULT_GOAL_BASE_SCORE,
    };

    if time_horizon > 10 {
        score += 20;
    } else if time_horizon > 5 {
        score += 10;
    } else if time_horizon < 2 {
        score -= 15;
    }

    score.clamp(0, 100)
}

pub(crate) fn age_score(age: u32) -> i64 {
    match age {
        0..=29 => 80,
        30..=39 => 70,
        40..=49 => 60,
        50..=59 => 45,
        _ => 30,
    }
}

pub(crate) fn risk_level(risk_score: u32) -> RiskLevel {
    if risk_score >= HIGH_RISK_FLOOR {
        RiskLevel::High
    } else if risk_score >= MEDIUM_RISK_FLOOR {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Display percentage; tracks the rounded score.
pub(crate) fn risk_percentage(overall: f64) -> u32 {
    rounded_score(overall)
}

fn rounded_score(overall: f64) -> u32 {
    round_half_up(overall.clamp(0.0, 100.0)) as u32
}

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
