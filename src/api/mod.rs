use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::core::{
    FinancialProfile, InvestmentExperience, InvestmentGoal, MAX_AGE, MIN_AGE,
    MIN_TIME_HORIZON_YEARS, ProfileError, RiskResult, RiskTolerance, calculate_risk,
};
use crate::store::{AssessmentRecord, AssessmentStore};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Header carrying the caller identity set by the fronting gateway.
pub const OWNER_HEADER: &str = "x-user-id";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInvestmentExperience {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl From<CliInvestmentExperience> for InvestmentExperience {
    fn from(value: CliInvestmentExperience) -> Self {
        match value {
            CliInvestmentExperience::Beginner => InvestmentExperience::Beginner,
            CliInvestmentExperience::Intermediate => InvestmentExperience::Intermediate,
            CliInvestmentExperience::Advanced => InvestmentExperience::Advanced,
            CliInvestmentExperience::Expert => InvestmentExperience::Expert,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl From<CliRiskTolerance> for RiskTolerance {
    fn from(value: CliRiskTolerance) -> Self {
        match value {
            CliRiskTolerance::Conservative => RiskTolerance::Conservative,
            CliRiskTolerance::Moderate => RiskTolerance::Moderate,
            CliRiskTolerance::Aggressive => RiskTolerance::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInvestmentGoal {
    Retirement,
    Education,
    House,
    Business,
    #[value(name = "wealth_building", alias = "wealth-building")]
    WealthBuilding,
    #[value(name = "emergency_fund", alias = "emergency-fund")]
    EmergencyFund,
}

impl From<CliInvestmentGoal> for InvestmentGoal {
    fn from(value: CliInvestmentGoal) -> Self {
        match value {
            CliInvestmentGoal::Retirement => InvestmentGoal::Retirement,
            CliInvestmentGoal::Education => InvestmentGoal::Education,
            CliInvestmentGoal::House => InvestmentGoal::House,
            CliInvestmentGoal::Business => InvestmentGoal::Business,
            CliInvestmentGoal::WealthBuilding => InvestmentGoal::WealthBuilding,
            CliInvestmentGoal::EmergencyFund => InvestmentGoal::EmergencyFund,
        }
    }
}

/// Questionnaire answers for `finrisk assess`.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, help = "Monthly take-home income, must be > 0")]
    monthly_income: f64,
    #[arg(long)]
    monthly_expenses: f64,
    #[arg(long)]
    total_savings: f64,
    #[arg(long, default_value_t = 0.0)]
    total_debt: f64,
    #[arg(long, value_enum)]
    investment_experience: CliInvestmentExperience,
    #[arg(long, value_enum)]
    risk_tolerance: CliRiskTolerance,
    #[arg(long, value_enum)]
    investment_goal: CliInvestmentGoal,
    #[arg(long, help = "Investment time horizon in years")]
    time_horizon: u32,
    #[arg(long)]
    age: u32,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please provide all required assessment data")]
    MissingFields,
    #[error("Please provide valid numeric values: {0}")]
    InvalidNumbers(ProfileError),
    #[error("Invalid assessment data: {0}")]
    InvalidChoice(ProfileError),
    #[error("Invalid JSON payload: {0}")]
    MalformedBody(String),
    #[error("Access denied. No user identity provided.")]
    MissingOwner,
    #[error("Assessment not found")]
    AssessmentNotFound,
    #[error("Not found")]
    RouteNotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields
            | ApiError::InvalidNumbers(_)
            | ApiError::InvalidChoice(_)
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingOwner => StatusCode::UNAUTHORIZED,
            ApiError::AssessmentNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::UnsupportedChoice { .. } => ApiError::InvalidChoice(err),
            _ => ApiError::InvalidNumbers(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AssessPayload {
    monthly_income: Option<f64>,
    monthly_expenses: Option<f64>,
    total_savings: Option<f64>,
    total_debt: Option<f64>,
    investment_experience: Option<InvestmentExperience>,
    risk_tolerance: Option<RiskTolerance>,
    investment_goal: Option<InvestmentGoal>,
    // Read as numbers so negatives and fractions get a validation error.
    time_horizon: Option<f64>,
    age: Option<f64>,
}

#[derive(Debug, Serialize)]
struct DataResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    success: bool,
    count: usize,
    data: Vec<AssessmentRecord>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<AssessmentStore>,
    history_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<AssessmentStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit,
        }
    }
}

pub fn build_profile(args: ProfileArgs) -> Result<FinancialProfile, ProfileError> {
    let profile = FinancialProfile {
        monthly_income: args.monthly_income,
        monthly_expenses: args.monthly_expenses,
        total_savings: args.total_savings,
        total_debt: args.total_debt,
        investment_experience: args.investment_experience.into(),
        risk_tolerance: args.risk_tolerance.into(),
        investment_goal: args.investment_goal.into(),
        time_horizon: args.time_horizon,
        age: args.age,
    };
    profile.validate()?;
    Ok(profile)
}

/// Scores the profile described by CLI flags and renders it as pretty JSON.
pub fn run_assess_command(args: ProfileArgs) -> Result<String, String> {
    let profile = build_profile(args).map_err(|e| e.to_string())?;
    let result = calculate_risk(&profile);
    serde_json::to_string_pretty(&result).map_err(|e| format!("failed to render result: {e}"))
}

fn profile_from_payload(payload: AssessPayload) -> Result<FinancialProfile, ApiError> {
    let (
        Some(monthly_income),
        Some(monthly_expenses),
        Some(total_savings),
        Some(total_debt),
        Some(investment_experience),
        Some(risk_tolerance),
        Some(investment_goal),
        Some(time_horizon),
        Some(age),
    ) = (
        payload.monthly_income,
        payload.monthly_expenses,
        payload.total_savings,
        payload.total_debt,
        payload.investment_experience,
        payload.risk_tolerance,
        payload.investment_goal,
        payload.time_horizon,
        payload.age,
    )
    else {
        return Err(ApiError::MissingFields);
    };

    let time_horizon = whole_number(time_horizon, "time horizon")?;
    if time_horizon < f64::from(MIN_TIME_HORIZON_YEARS) {
        return Err(ProfileError::TimeHorizonTooShort.into());
    }
    let age = whole_number(age, "age")?;
    if !(f64::from(MIN_AGE)..=f64::from(MAX_AGE)).contains(&age) {
        return Err(ProfileError::AgeOutOfRange.into());
    }

    let profile = FinancialProfile {
        monthly_income,
        monthly_expenses,
        total_savings,
        total_debt,
        investment_experience,
        risk_tolerance,
        investment_goal,
        // Saturates; any horizon past ten years scores the same.
        time_horizon: time_horizon as u32,
        age: age as u32,
    };
    profile.validate()?;
    Ok(profile)
}

fn whole_number(value: f64, field: &'static str) -> Result<f64, ProfileError> {
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value)
    } else {
        Err(ProfileError::NotWholeNumber { field })
    }
}

fn owner_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingOwner)
}

fn parse_assessment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::AssessmentNotFound)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/health", get(health_handler))
        .route("/api/risk/assess", post(assess_handler))
        .route("/api/risk/history", get(history_handler))
        .route(
            "/api/risk/:id",
            get(get_assessment_handler).delete(delete_assessment_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let state = AppState::new(Arc::new(AssessmentStore::new()), config.history_limit);
    let app = build_router(state);

    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "risk assessment API listening");
    info!("local access: http://127.0.0.1:{}/", config.addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("risk assessment API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    ApiError::RouteNotFound.into_response()
}

async fn assess_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AssessPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let Json(payload) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let profile = profile_from_payload(payload).inspect_err(|e| {
        warn!(owner = %owner, error = %e, "rejected assessment request");
    })?;

    let result: RiskResult = calculate_risk(&profile);
    let record = state.store.insert(&owner, profile, result).await;
    info!(
        owner = %owner,
        id = %record.id,
        risk_score = record.result.risk_score,
        risk_level = ?record.result.risk_level,
        "stored risk assessment"
    );

    Ok(json_response(
        StatusCode::CREATED,
        DataResponse {
            success: true,
            data: record,
        },
    ))
}

async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let records = state.store.history(&owner, state.history_limit).await;
    Ok(json_response(
        StatusCode::OK,
        HistoryResponse {
            success: true,
            count: records.len(),
            data: records,
        },
    ))
}

async fn get_assessment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let id = parse_assessment_id(&raw_id)?;
    let record = state
        .store
        .get(&owner, id)
        .await
        .ok_or(ApiError::AssessmentNotFound)?;
    Ok(json_response(
        StatusCode::OK,
        DataResponse {
            success: true,
            data: record,
        },
    ))
}

async fn delete_assessment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let id = parse_assessment_id(&raw_id)?;
    if !state.store.delete(&owner, id).await {
        return Err(ApiError::AssessmentNotFound);
    }
    info!(owner = %owner, id = %id, "deleted risk assessment");
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            success: true,
            message: "Assessment deleted successfully",
        },
    ))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            success: false,
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn profile_from_json(json: &str) -> Result<FinancialProfile, ApiError> {
    let payload = serde_json::from_str::<AssessPayload>(json)
        .map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    profile_from_payload(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderValue, Method, Request};
    use clap::Parser;
    use std::fs;
    use std::path::Path as FsPath;
    use tower::ServiceExt;

    const WORKED_EXAMPLE_JSON: &str = r#"{
      "monthlyIncome": 5000,
      "monthlyExpenses": 3000,
      "totalSavings": 25000,
      "totalDebt": 10000,
      "investmentExperience": "intermediate",
      "riskTolerance": "moderate",
      "investmentGoal": "retirement",
      "timeHorizon": 10,
      "age": 35
    }"#;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        profile: ProfileArgs,
    }

    fn assert_golden_snapshot(path: &str, actual: &str) {
        let update = matches!(
            std::env::var("UPDATE_GOLDEN").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );
        let snapshot_path = FsPath::new(path);

        if update {
            if let Some(parent) = snapshot_path.parent() {
                fs::create_dir_all(parent).expect("failed to create snapshot directory");
            }
            fs::write(snapshot_path, actual).expect("failed to write golden snapshot");
            return;
        }

        let expected = fs::read_to_string(snapshot_path).unwrap_or_else(|_| {
            panic!("missing golden snapshot at {path}; run with UPDATE_GOLDEN=1 to generate")
        });
        assert_eq!(
            actual, expected,
            "snapshot mismatch for {path}; run with UPDATE_GOLDEN=1 to refresh if expected"
        );
    }

    fn test_state() -> AppState {
        AppState::new(Arc::new(AssessmentStore::new()), 10)
    }

    fn owner_headers(owner: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_str(owner).expect("header"));
        headers
    }

    fn worked_example_payload() -> AssessPayload {
        serde_json::from_str(WORKED_EXAMPLE_JSON).expect("payload parses")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn unwrap_response(result: Result<Response, ApiError>) -> Response {
        match result {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }

    #[test]
    fn profile_from_json_parses_web_keys() {
        let profile = profile_from_json(WORKED_EXAMPLE_JSON).expect("json should parse");
        assert_eq!(profile.monthly_income, 5_000.0);
        assert_eq!(profile.total_debt, 10_000.0);
        assert_eq!(
            profile.investment_experience,
            InvestmentExperience::Intermediate
        );
        assert_eq!(profile.risk_tolerance, RiskTolerance::Moderate);
        assert_eq!(profile.investment_goal, InvestmentGoal::Retirement);
        assert_eq!(profile.time_horizon, 10);
        assert_eq!(profile.age, 35);
    }

    #[test]
    fn profile_from_json_parses_snake_case_goals() {
        let json = WORKED_EXAMPLE_JSON.replace("\"retirement\"", "\"wealth_building\"");
        let profile = profile_from_json(&json).expect("json should parse");
        assert_eq!(profile.investment_goal, InvestmentGoal::WealthBuilding);
    }

    #[test]
    fn profile_from_json_requires_every_field() {
        let json = r#"{"monthlyIncome": 5000, "monthlyExpenses": 3000}"#;
        let err = profile_from_json(json).expect_err("must reject partial payload");
        assert!(matches!(err, ApiError::MissingFields));
        assert_eq!(err.to_string(), "Please provide all required assessment data");
    }

    #[test]
    fn profile_from_json_accepts_zero_savings_debt_and_expenses() {
        let json = WORKED_EXAMPLE_JSON
            .replace("\"monthlyExpenses\": 3000", "\"monthlyExpenses\": 0")
            .replace("\"totalSavings\": 25000", "\"totalSavings\": 0")
            .replace("\"totalDebt\": 10000", "\"totalDebt\": 0");
        let profile = profile_from_json(&json).expect("zero amounts are valid");
        assert_eq!(profile.monthly_expenses, 0.0);
    }

    #[test]
    fn profile_from_json_rejects_out_of_range_numbers() {
        for (from, to) in [
            ("\"monthlyIncome\": 5000", "\"monthlyIncome\": 0"),
            ("\"totalDebt\": 10000", "\"totalDebt\": -1"),
            ("\"age\": 35", "\"age\": 17"),
            ("\"age\": 35", "\"age\": 101"),
            ("\"age\": 35", "\"age\": -1"),
            ("\"age\": 35", "\"age\": 35.5"),
            ("\"timeHorizon\": 10", "\"timeHorizon\": 0"),
            ("\"timeHorizon\": 10", "\"timeHorizon\": -3"),
            ("\"timeHorizon\": 10", "\"timeHorizon\": 2.5"),
        ] {
            let json = WORKED_EXAMPLE_JSON.replace(from, to);
            let err = profile_from_json(&json).expect_err("must reject out-of-range value");
            assert!(matches!(err, ApiError::InvalidNumbers(_)), "{to}: {err}");
            assert!(err.to_string().starts_with("Please provide valid numeric values"));
        }
    }

    #[test]
    fn profile_from_json_accepts_integral_floats_and_huge_horizons() {
        let json = WORKED_EXAMPLE_JSON
            .replace("\"age\": 35", "\"age\": 35.0")
            .replace("\"timeHorizon\": 10", "\"timeHorizon\": 1e12");
        let profile = profile_from_json(&json).expect("whole numbers are valid");
        assert_eq!(profile.age, 35);
        assert_eq!(profile.time_horizon, u32::MAX);
    }

    #[test]
    fn fractional_horizon_reports_whole_number_error() {
        let json = WORKED_EXAMPLE_JSON.replace("\"timeHorizon\": 10", "\"timeHorizon\": 2.5");
        let err = profile_from_json(&json).expect_err("must reject fractional years");
        assert_eq!(
            err.to_string(),
            "Please provide valid numeric values: time horizon must be a whole number"
        );
    }

    #[test]
    fn profile_from_json_rejects_unknown_choices() {
        let json = WORKED_EXAMPLE_JSON.replace("\"moderate\"", "\"reckless\"");
        let err = profile_from_json(&json).expect_err("must reject unknown tolerance");
        assert!(matches!(
            err,
            ApiError::InvalidChoice(ProfileError::UnsupportedChoice {
                field: "risk tolerance"
            })
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn build_profile_converts_cli_flags() {
        let cli = TestCli::try_parse_from([
            "finrisk",
            "--monthly-income",
            "5000",
            "--monthly-expenses",
            "3000",
            "--total-savings",
            "25000",
            "--total-debt",
            "10000",
            "--investment-experience",
            "intermediate",
            "--risk-tolerance",
            "moderate",
            "--investment-goal",
            "emergency_fund",
            "--time-horizon",
            "10",
            "--age",
            "35",
        ])
        .expect("flags parse");
        let profile = build_profile(cli.profile).expect("valid profile");
        assert_eq!(profile.investment_goal, InvestmentGoal::EmergencyFund);
        assert_eq!(profile.monthly_expenses, 3_000.0);
    }

    #[test]
    fn run_assess_command_reports_validation_errors() {
        let cli = TestCli::try_parse_from([
            "finrisk",
            "--monthly-income",
            "0",
            "--monthly-expenses",
            "3000",
            "--total-savings",
            "25000",
            "--investment-experience",
            "expert",
            "--risk-tolerance",
            "aggressive",
            "--investment-goal",
            "house",
            "--time-horizon",
            "3",
            "--age",
            "40",
        ])
        .expect("flags parse");
        let err = run_assess_command(cli.profile).expect_err("must reject zero income");
        assert!(err.contains("monthly income"));
    }

    #[test]
    fn golden_snapshot_worked_example_json() {
        let profile = profile_from_json(WORKED_EXAMPLE_JSON).expect("json should parse");
        let result = calculate_risk(&profile);
        let json = format!(
            "{}\n",
            serde_json::to_string(&result).expect("result should serialize")
        );

        assert_golden_snapshot("tests/golden/worked_example_result.json", &json);
    }

    #[tokio::test]
    async fn assess_stores_and_returns_created_record() {
        let state = test_state();
        let response = unwrap_response(
            assess_handler(
                State(state.clone()),
                owner_headers("alice"),
                Ok(Json(worked_example_payload())),
            )
            .await,
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["riskScore"], 69);
        assert_eq!(body["data"]["riskLevel"], "Medium");
        assert_eq!(body["data"]["riskPercentage"], 69);
        assert_eq!(body["data"]["assessmentData"]["age"], 35);

        let history = state.store.history("alice", 10).await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn assess_requires_owner_header() {
        let response = unwrap_response(
            assess_handler(
                State(test_state()),
                HeaderMap::new(),
                Ok(Json(worked_example_payload())),
            )
            .await,
        );
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Access denied. No user identity provided.");
    }

    #[tokio::test]
    async fn assess_rejects_invalid_profile_without_storing() {
        let state = test_state();
        let mut payload = worked_example_payload();
        payload.monthly_income = Some(0.0);
        let response = unwrap_response(
            assess_handler(State(state.clone()), owner_headers("alice"), Ok(Json(payload))).await,
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.history("alice", 10).await.is_empty());
    }

    #[tokio::test]
    async fn history_get_and_delete_round_trip() {
        let state = test_state();
        let created = body_json(unwrap_response(
            assess_handler(
                State(state.clone()),
                owner_headers("alice"),
                Ok(Json(worked_example_payload())),
            )
            .await,
        ))
        .await;
        let id = created["data"]["id"].as_str().expect("id").to_string();

        let history = body_json(unwrap_response(
            history_handler(State(state.clone()), owner_headers("alice")).await,
        ))
        .await;
        assert_eq!(history["count"], 1);
        assert_eq!(history["data"][0]["id"], id.as_str());

        let fetched = unwrap_response(
            get_assessment_handler(
                State(state.clone()),
                owner_headers("alice"),
                Path(id.clone()),
            )
            .await,
        );
        assert_eq!(fetched.status(), StatusCode::OK);

        let foreign = unwrap_response(
            get_assessment_handler(State(state.clone()), owner_headers("bob"), Path(id.clone()))
                .await,
        );
        assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

        let deleted = unwrap_response(
            delete_assessment_handler(
                State(state.clone()),
                owner_headers("alice"),
                Path(id.clone()),
            )
            .await,
        );
        assert_eq!(deleted.status(), StatusCode::OK);
        let body = body_json(deleted).await;
        assert_eq!(body["message"], "Assessment deleted successfully");

        let gone = unwrap_response(
            get_assessment_handler(State(state), owner_headers("alice"), Path(id)).await,
        );
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        let body = body_json(gone).await;
        assert_eq!(body["error"], "Assessment not found");
    }

    #[tokio::test]
    async fn malformed_assessment_id_is_not_found() {
        let response = unwrap_response(
            delete_assessment_handler(
                State(test_state()),
                owner_headers("alice"),
                Path("not-a-uuid".to_string()),
            )
            .await,
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_routes_return_json_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not found");
    }

    fn request(method: Method, uri: &str, owner: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }
        builder.body(body).expect("request")
    }

    #[tokio::test]
    async fn router_serves_assets_health_and_assessment_routes() {
        let app = build_router(test_state());

        let health = app
            .clone()
            .oneshot(request(Method::GET, "/health", None, Body::empty()))
            .await
            .expect("health");
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(body_json(health).await["status"], "ok");

        let script = app
            .clone()
            .oneshot(request(Method::GET, "/app.js", None, Body::empty()))
            .await
            .expect("app.js");
        assert_eq!(script.status(), StatusCode::OK);
        assert_eq!(
            script.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/javascript; charset=utf-8"))
        );

        let created = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/risk/assess",
                Some("alice"),
                Body::from(WORKED_EXAMPLE_JSON),
            ))
            .await
            .expect("assess");
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = body_json(created).await["data"]["id"]
            .as_str()
            .expect("id")
            .to_string();

        let fetched = app
            .clone()
            .oneshot(request(
                Method::GET,
                &format!("/api/risk/{id}"),
                Some("alice"),
                Body::empty(),
            ))
            .await
            .expect("get by id");
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(body_json(fetched).await["data"]["riskScore"], 69);

        let history = app
            .clone()
            .oneshot(request(
                Method::GET,
                "/api/risk/history",
                Some("alice"),
                Body::empty(),
            ))
            .await
            .expect("history");
        assert_eq!(body_json(history).await["count"], 1);

        let deleted = app
            .clone()
            .oneshot(request(
                Method::DELETE,
                &format!("/api/risk/{id}"),
                Some("alice"),
                Body::empty(),
            ))
            .await
            .expect("delete");
        assert_eq!(deleted.status(), StatusCode::OK);

        let missing = app
            .oneshot(request(Method::GET, "/no/such/page", None, Body::empty()))
            .await
            .expect("fallback");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            missing.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        assert_eq!(
            body_json(missing).await,
            serde_json::json!({"success": false, "error": "Not found"})
        );
    }

    #[tokio::test]
    async fn router_reports_malformed_json_as_bad_request() {
        let response = build_router(test_state())
            .oneshot(request(
                Method::POST,
                "/api/risk/assess",
                Some("alice"),
                Body::from("{not json"),
            ))
            .await
            .expect("assess");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(
            body["error"]
                .as_str()
                .expect("message")
                .starts_with("Invalid JSON payload")
        );
    }
}
