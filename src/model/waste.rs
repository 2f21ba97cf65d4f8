//! Waste-detection result shape.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::lenient;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WastePayload {
    #[serde(deserialize_with = "lenient::object")]
    pub waste_analysis: WasteAnalysisPayload,
    #[serde(deserialize_with = "lenient::list")]
    pub idle_periods: Vec<IdlePeriodPayload>,
    #[serde(deserialize_with = "lenient::strings")]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WasteAnalysisPayload {
    #[serde(deserialize_with = "lenient::number")]
    pub estimated_monthly_savings: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_waste_percentage: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub underutilized_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdlePeriodPayload {
    #[serde(deserialize_with = "lenient::text")]
    pub start: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub end: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub duration_hours: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub avg_cpu: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub avg_memory: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub wasted_cost: Option<f64>,
}

/// A waste result with defaults applied.
///
/// Idle-period utilisation and duration stay optional: an absent value is
/// displayed differently from an explicit zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WasteReport {
    pub estimated_monthly_savings: f64,
    pub total_waste_percentage: f64,
    pub underutilized_score: f64,
    pub idle_periods: Vec<IdlePeriod>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdlePeriod {
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration_hours: Option<f64>,
    pub avg_cpu: Option<f64>,
    pub avg_memory: Option<f64>,
    pub wasted_cost: f64,
}

impl WasteReport {
    pub fn from_result(result: &Map<String, Value>) -> Self {
        WastePayload::from_result(result).materialize()
    }

    /// Sum of wasted cost across every idle period.
    pub fn total_waste(&self) -> f64 {
        self.idle_periods.iter().map(|p| p.wasted_cost).sum()
    }

    /// Sum of idle hours across every idle period.
    pub fn total_hours(&self) -> f64 {
        self.idle_periods
            .iter()
            .map(|p| p.duration_hours.unwrap_or(0.0))
            .sum()
    }
}

impl WastePayload {
    pub fn from_result(result: &Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(result.clone())).unwrap_or_default()
    }

    pub fn materialize(self) -> WasteReport {
        let analysis = self.waste_analysis;
        WasteReport {
            estimated_monthly_savings: analysis.estimated_monthly_savings.unwrap_or(0.0),
            total_waste_percentage: analysis.total_waste_percentage.unwrap_or(0.0),
            underutilized_score: analysis.underutilized_score.unwrap_or(0.0),
            idle_periods: self
                .idle_periods
                .into_iter()
                .map(|p| IdlePeriod {
                    start: p.start,
                    end: p.end,
                    duration_hours: p.duration_hours,
                    avg_cpu: p.avg_cpu,
                    avg_memory: p.avg_memory,
                    wasted_cost: p.wasted_cost.unwrap_or(0.0),
                })
                .collect(),
            recommendations: self.recommendations,
        }
    }
}
