//! Cost-prediction result shape.
//!
//! [`PredictionPayload`] mirrors what `/predict-cost` may send, every field
//! optional. [`PredictionPayload::materialize`] applies all defaults once and
//! yields a [`PredictionReport`] the renderer can use without further checks.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::lenient;

/// Trend label used when the service sends none.
pub const DEFAULT_TREND: &str = "stable";
/// Forecast confidence used when the service sends none, or sends `0`.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;
/// Bottleneck risk label used when the service sends none.
pub const DEFAULT_RISK: &str = "medium";

// ---------------------------------------------------------------------------
// Partial payload
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PredictionPayload {
    #[serde(deserialize_with = "lenient::object")]
    pub cost_predictions: CostPredictionsPayload,
    #[serde(deserialize_with = "lenient::list")]
    pub optimization_opportunities: Vec<OpportunityPayload>,
    #[serde(deserialize_with = "lenient::object")]
    pub performance_predictions: PerformancePayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CostPredictionsPayload {
    #[serde(deserialize_with = "lenient::list")]
    pub predicted_cost_next_7_days: Vec<DailyForecastPayload>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_predicted_weekly_cost: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub trend: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyForecastPayload {
    #[serde(deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub weekday: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub cost: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub avg_cpu: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub avg_memory: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityPayload {
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub savings_potential: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PerformancePayload {
    #[serde(deserialize_with = "lenient::number")]
    pub expected_peak_cpu: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub expected_peak_memory: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub bottleneck_risk: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub peak_time_prediction: Option<String>,
}

// ---------------------------------------------------------------------------
// Materialized report
// ---------------------------------------------------------------------------

/// A prediction result with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    pub forecast: Vec<DailyForecast>,
    pub total_weekly_cost: f64,
    pub trend: String,
    pub confidence: f64,
    pub opportunities: Vec<Opportunity>,
    pub performance: PerformanceOutlook,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: Option<String>,
    pub weekday: Option<String>,
    pub cost: f64,
    pub avg_cpu: f64,
    pub avg_memory: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    /// Raw `type` tag; `None` when the service omitted it.
    pub kind: Option<String>,
    pub savings_potential: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceOutlook {
    pub expected_peak_cpu: f64,
    pub expected_peak_memory: f64,
    pub bottleneck_risk: String,
    pub peak_time: Option<String>,
}

impl PredictionReport {
    /// Decode and materialize a raw result object.
    pub fn from_result(result: &Map<String, Value>) -> Self {
        PredictionPayload::from_result(result).materialize()
    }

    /// Sum of `savings_potential` across all opportunities.
    pub fn total_savings(&self) -> f64 {
        self.opportunities.iter().map(|o| o.savings_potential).sum()
    }
}

impl PredictionPayload {
    /// Decode a raw result object. Never fails: unusable fields are absent.
    pub fn from_result(result: &Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(result.clone())).unwrap_or_default()
    }

    /// Apply every default in one place.
    pub fn materialize(self) -> PredictionReport {
        let cost = self.cost_predictions;
        let perf = self.performance_predictions;

        PredictionReport {
            forecast: cost
                .predicted_cost_next_7_days
                .into_iter()
                .map(|day| DailyForecast {
                    date: non_empty(day.date),
                    weekday: non_empty(day.weekday),
                    cost: day.cost.unwrap_or(0.0),
                    avg_cpu: day.avg_cpu.unwrap_or(0.0),
                    avg_memory: day.avg_memory.unwrap_or(0.0),
                })
                .collect(),
            total_weekly_cost: cost.total_predicted_weekly_cost.unwrap_or(0.0),
            trend: non_empty(cost.trend).unwrap_or_else(|| DEFAULT_TREND.to_string()),
            confidence: cost
                .confidence
                .filter(|c| *c != 0.0 && !c.is_nan())
                .unwrap_or(DEFAULT_CONFIDENCE),
            opportunities: self
                .optimization_opportunities
                .into_iter()
                .map(|opp| Opportunity {
                    kind: opp.kind,
                    savings_potential: opp.savings_potential.unwrap_or(0.0),
                    confidence: opp.confidence.unwrap_or(0.0),
                })
                .collect(),
            performance: PerformanceOutlook {
                expected_peak_cpu: perf.expected_peak_cpu.unwrap_or(0.0),
                expected_peak_memory: perf.expected_peak_memory.unwrap_or(0.0),
                bottleneck_risk: non_empty(perf.bottleneck_risk)
                    .unwrap_or_else(|| DEFAULT_RISK.to_string()),
                peak_time: non_empty(perf.peak_time_prediction),
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: Value) -> PredictionReport {
        match value {
            Value::Object(map) => PredictionReport::from_result(&map),
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn empty_payload_materializes_defaults() {
        let r = report(json!({}));
        assert!(r.forecast.is_empty());
        assert_eq!(r.total_weekly_cost, 0.0);
        assert_eq!(r.trend, "stable");
        assert_eq!(r.confidence, 0.9);
        assert!(r.opportunities.is_empty());
        assert_eq!(r.performance.bottleneck_risk, "medium");
        assert_eq!(r.performance.peak_time, None);
    }

    #[test]
    fn explicit_values_are_kept() {
        let r = report(json!({
            "cost_predictions": {
                "total_predicted_weekly_cost": 123.4,
                "trend": "rising",
                "confidence": 0.75,
                "predicted_cost_next_7_days": [
                    {"date": "2024-01-15", "weekday": "Monday", "cost": 17.5, "avg_cpu": 40}
                ]
            },
            "performance_predictions": {"bottleneck_risk": "high", "peak_time_prediction": "2024-01-15T14:30:00"}
        }));
        assert_eq!(r.total_weekly_cost, 123.4);
        assert_eq!(r.trend, "rising");
        assert_eq!(r.confidence, 0.75);
        assert_eq!(r.forecast[0].weekday.as_deref(), Some("Monday"));
        assert_eq!(r.forecast[0].avg_cpu, 40.0);
        assert_eq!(r.forecast[0].avg_memory, 0.0);
        assert_eq!(r.performance.bottleneck_risk, "high");
        assert!(r.performance.peak_time.is_some());
    }

    #[test]
    fn zero_confidence_falls_back() {
        let r = report(json!({"cost_predictions": {"confidence": 0}}));
        assert_eq!(r.confidence, 0.9);
        let r = report(json!({"cost_predictions": {"confidence": 0.0}}));
        assert_eq!(r.confidence, 0.9);
    }

    #[test]
    fn empty_trend_falls_back() {
        let r = report(json!({"cost_predictions": {"trend": ""}}));
        assert_eq!(r.trend, "stable");
    }

    #[test]
    fn total_savings_treats_missing_as_zero() {
        let r = report(json!({
            "optimization_opportunities": [
                {"type": "right_sizing", "savings_potential": 10.25},
                {"type": "scheduling"},
                {"type": "other", "savings_potential": 4.75}
            ]
        }));
        assert_eq!(r.total_savings(), 15.0);
        assert_eq!(report(json!({})).total_savings(), 0.0);
    }

    #[test]
    fn mistyped_sections_do_not_poison_the_payload() {
        let r = report(json!({
            "cost_predictions": "oops",
            "optimization_opportunities": [{"type": "auto_scaling", "savings_potential": 3}]
        }));
        assert_eq!(r.total_weekly_cost, 0.0);
        assert_eq!(r.opportunities.len(), 1);
    }
}
