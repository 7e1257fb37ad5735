use super::engine::{HIGH_RISK_FLOOR, MEDIUM_RISK_FLOOR, round_half_up};
use super::types::{
    DetailedAnalysis, FinancialProfile, Priority, RatioAssessment, Recommendation,
    ScoredDescription,
};

const DEBT_MANAGEMENT: Recommendation = Recommendation {
    category: "Debt Management",
    suggestion: "Consider debt consolidation or aggressive debt payoff strategy. Your debt-to-income ratio is above recommended levels.",
    priority: Priority::High,
};

const EMERGENCY_FUND: Recommendation = Recommendation {
    category: "Emergency Fund",
    suggestion: "Build emergency fund to cover 3-6 months of expenses before making high-risk investments.",
    priority: Priority::High,
};

const CONSERVATIVE_STRATEGY: Recommendation = Recommendation {
    category: "Investment Strategy",
    suggestion: "Focus on conservative investments like bonds, CDs, and blue-chip dividend stocks.",
    priority: Priority::Medium,
};

const BALANCED_STRATEGY: Recommendation = Recommendation {
    category: "Investment Strategy",
    suggestion: "Consider a balanced portfolio with mix of stocks and bonds appropriate for moderate risk tolerance.",
    priority: Priority::Medium,
};

const GROWTH_STRATEGY: Recommendation = Recommendation {
    category: "Investment Strategy",
    suggestion: "You can consider growth stocks and higher-risk investments, but maintain proper diversification.",
    priority: Priority::Medium,
};

const RISK_MANAGEMENT: Recommendation = Recommendation {
    category: "Risk Management",
    suggestion: "Ensure adequate insurance coverage and consider dollar-cost averaging for investments.",
    priority: Priority::Low,
};

/// Debt above this multiple of monthly income triggers debt advice.
const DEBT_ADVICE_RATIO: f64 = 0.30;
/// Savings below this many months of expenses triggers emergency-fund advice.
const EMERGENCY_FUND_ADVICE_MONTHS: f64 = 3.0;

/// Advice in fixed order: debt, emergency fund, strategy, risk management.
///
/// The strategy band is chosen from the unrounded weighted score, so `69.75`
/// still gets balanced advice even though it reports as 70.
pub(crate) fn build_recommendations(
    profile: &FinancialProfile,
    overall: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::with_capacity(4);

    let debt_to_income = profile.total_debt / profile.monthly_income;
    if debt_to_income > DEBT_ADVICE_RATIO {
        recommendations.push(DEBT_MANAGEMENT);
    }

    let emergency_fund_months = profile.total_savings / profile.monthly_expenses;
    if emergency_fund_months < EMERGENCY_FUND_ADVICE_MONTHS {
        recommendations.push(EMERGENCY_FUND);
    }

    recommendations.push(if overall < f64::from(MEDIUM_RISK_FLOOR) {
        CONSERVATIVE_STRATEGY
    } else if overall < f64::from(HIGH_RISK_FLOOR) {
        BALANCED_STRATEGY
    } else {
        GROWTH_STRATEGY
    });

    recommendations.push(RISK_MANAGEMENT);
    recommendations
}

pub(crate) fn build_detailed_analysis(
    profile: &FinancialProfile,
    stability_score: i64,
) -> DetailedAnalysis {
    let income = profile.monthly_income;
    let expenses = profile.monthly_expenses;

    let debt_to_income_pct = (profile.total_debt / income) * 100.0;
    let emergency_fund_ratio = profile.total_savings / (expenses * 6.0);
    let savings_rate = ((income - expenses) / income) * 100.0;

    DetailedAnalysis {
        financial_stability: ScoredDescription {
            score: stability_score,
            description: stability_description(savings_rate),
        },
        debt_to_income_ratio: RatioAssessment {
            ratio: finite_round(debt_to_income_pct),
            assessment: debt_assessment(debt_to_income_pct),
        },
        emergency_fund_ratio: RatioAssessment {
            ratio: finite_round(emergency_fund_ratio * 100.0),
            assessment: emergency_fund_assessment(emergency_fund_ratio),
        },
        risk_capacity: ScoredDescription {
            score: round_half_up(savings_rate) as i64,
            description: risk_capacity_description(savings_rate),
        },
    }
}

fn finite_round(value: f64) -> Option<i64> {
    value.is_finite().then(|| round_half_up(value) as i64)
}

fn stability_description(savings_rate: f64) -> &'static str {
    if savings_rate > 20.0 {
        "Excellent financial stability with strong savings capacity"
    } else if savings_rate > 10.0 {
        "Good financial stability with moderate savings ability"
    } else if savings_rate > 0.0 {
        "Fair financial stability but limited savings capacity"
    } else {
        "Poor financial stability - expenses exceed income"
    }
}

fn debt_assessment(debt_to_income_pct: f64) -> &'static str {
    if debt_to_income_pct < 10.0 {
        "Excellent - Very low debt burden"
    } else if debt_to_income_pct < 30.0 {
        "Good - Manageable debt levels"
    } else if debt_to_income_pct < 50.0 {
        "Caution - High debt burden"
    } else {
        "Critical - Excessive debt levels"
    }
}

fn emergency_fund_assessment(ratio: f64) -> &'static str {
    if ratio >= 1.0 {
        "Excellent - Well-prepared for emergencies"
    } else if ratio >= 0.5 {
        "Good - Adequate emergency preparation"
    } else if ratio >= 0.25 {
        "Fair - Basic emergency coverage"
    } else {
        "Poor - Insufficient emergency fund"
    }
}

fn risk_capacity_description(savings_rate: f64) -> &'static str {
    if savings_rate > 20.0 {
        "High capacity for investment risk due to strong cash flow"
    } else if savings_rate > 10.0 {
        "Moderate capacity for investment risk"
    } else if savings_rate > 0.0 {
        "Limited capacity for investment risk"
    } else {
        "No capacity for investment risk - focus on income/expense optimization"
    }
}
