mod advice;
mod engine;
mod types;

pub use engine::{ComponentScores, calculate_risk};
pub use types::{
    DetailedAnalysis, FinancialProfile, InvestmentExperience, InvestmentGoal, MAX_AGE, MIN_AGE,
    MIN_TIME_HORIZON_YEARS, Priority, ProfileError, RatioAssessment, Recommendation, RiskLevel,
    RiskResult, RiskTolerance, ScoredDescription,
};
