//! Pure renderers: analysis result → display structure.
//!
//! A renderer never reads the clock or any other ambient state, so rendering
//! the same [`AnalysisResult`] twice gives identical views. The terminal
//! printer in `cli` and the web dashboard both consume these structures.

pub mod format;
pub mod prediction;
pub mod waste;

use serde::Serialize;

use crate::controller::{ActionKind, AnalysisResult};
use crate::model::{PredictionReport, WasteReport};

pub use prediction::PredictionView;
pub use waste::WasteView;

/// Accent color of a summary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Blue,
    Green,
    Purple,
    Orange,
    Red,
}

/// A headline metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub title: String,
    pub value: String,
    pub subtitle: String,
    pub tone: Tone,
}

impl SummaryCard {
    pub fn new(
        title: impl Into<String>,
        value: impl Into<String>,
        subtitle: impl Into<String>,
        tone: Tone,
    ) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            subtitle: subtitle.into(),
            tone,
        }
    }
}

/// A proportional bar: `fill` in [0, 100] plus its text label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meter {
    pub fill: f64,
    pub label: String,
}

impl Meter {
    /// Utilisation bar: clamped fill, label with one decimal.
    pub fn percent(value: f64) -> Self {
        Self {
            fill: format::clamp_pct(value),
            label: format!("{}%", format::to_fixed(value, 1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultHeader {
    pub title: String,
    pub badge: String,
    /// `Analysis completed at ...` time.
    pub completed_at: String,
}

/// Either rendered variant, tagged for the web frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultView {
    Prediction(PredictionView),
    Waste(WasteView),
}

/// Render a result with the renderer matching the action that produced it.
pub fn render(result: &AnalysisResult) -> ResultView {
    let completed_at = format::completed_time(&result.completed_at);
    match result.action {
        ActionKind::Predict => {
            let header = ResultHeader {
                title: "Cost Prediction Results".to_string(),
                badge: "💰 Prediction".to_string(),
                completed_at,
            };
            ResultView::Prediction(prediction::render(
                &PredictionReport::from_result(&result.payload),
                header,
            ))
        }
        ActionKind::Waste => {
            let header = ResultHeader {
                title: "Waste Detection Results".to_string(),
                badge: "⚠️ Waste Detection".to_string(),
                completed_at,
            };
            ResultView::Waste(waste::render(&WasteReport::from_result(&result.payload), header))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use serde_json::{Value, json};

    fn result(action: ActionKind, value: Value) -> AnalysisResult {
        let Value::Object(map) = value else {
            panic!("test payload must be an object");
        };
        let at = Local.with_ymd_and_hms(2024, 5, 1, 16, 20, 0).unwrap();
        AnalysisResult::new(action, map, at)
    }

    #[test]
    fn dispatches_on_action() {
        let predict = result(ActionKind::Predict, json!({}));
        let waste = result(ActionKind::Waste, json!({}));
        assert!(matches!(render(&predict), ResultView::Prediction(_)));
        assert!(matches!(render(&waste), ResultView::Waste(_)));
    }

    #[test]
    fn rendering_is_idempotent() {
        let r = result(
            ActionKind::Waste,
            json!({
                "idle_periods": [{"start": "2024-02-01T00:00:00", "wasted_cost": 2}],
                "recommendations": ["Turn off dev boxes at night"]
            }),
        );
        assert_eq!(render(&r), render(&r));
    }

    #[test]
    fn header_uses_stored_completion_time() {
        let ResultView::Prediction(view) = render(&result(ActionKind::Predict, json!({}))) else {
            panic!("expected prediction view");
        };
        assert_eq!(view.header.title, "Cost Prediction Results");
        assert_eq!(view.header.completed_at, "4:20:00 PM");
    }

    #[test]
    fn view_serializes_with_kind_tag() {
        let json = serde_json::to_value(render(&result(ActionKind::Waste, json!({})))).unwrap();
        assert_eq!(json["kind"], "waste");
        assert_eq!(json["summary"][0]["tone"], "green");
    }

    #[test]
    fn meter_percent_clamps_fill_only() {
        let m = Meter::percent(123.45);
        assert_eq!(m.fill, 100.0);
        assert_eq!(m.label, "123.5%");
    }
}
