//! Cost-prediction result → display structure.

use serde::Serialize;

use super::format::{clamp_pct, clock_time, money, short_date, take_chars, to_fixed};
use super::{Meter, ResultHeader, SummaryCard, Tone};
use crate::model::PredictionReport;

/// Display labels for the opportunity types the service is known to emit:
/// `(type, icon, label)`.
const OPPORTUNITY_LABELS: [(&str, &str, &str); 4] = [
    ("right_sizing", "📏", "Right Sizing"),
    ("scheduling", "⏰", "Scheduling"),
    ("burstable_instance", "⚡", "Burstable Instances"),
    ("auto_scaling", "📈", "Auto Scaling"),
];

pub const NO_OPPORTUNITIES: &str = "No optimization opportunities found.";
pub const PEAK_TIME_UNAVAILABLE: &str = "Peak time not available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionView {
    pub header: ResultHeader,
    pub summary: Vec<SummaryCard>,
    pub forecast: Vec<ForecastRow>,
    pub trend: TrendBadge,
    pub performance: PerformancePanel,
    pub opportunities: Vec<OpportunityRow>,
    /// Shown instead of the list when there are no opportunities.
    pub empty_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: String,
    pub day: String,
    pub cost: String,
    pub cpu: Meter,
    pub memory: Meter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBadge {
    /// Raw trend value, e.g. `rising`.
    pub trend: String,
    /// `rising trend`
    pub label: String,
    /// `75%`
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePanel {
    pub peak_cpu: Meter,
    pub peak_memory: Meter,
    pub risk: String,
    /// `Peak: 02:30 PM` or [`PEAK_TIME_UNAVAILABLE`].
    pub peak_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRow {
    pub icon: Option<String>,
    pub label: String,
    pub savings: String,
    pub confidence: Meter,
}

/// Human label and icon for an opportunity `type`. Unknown types keep their
/// literal string and get no icon.
pub fn opportunity_label(kind: Option<&str>) -> (Option<&'static str>, String) {
    let Some(kind) = kind else {
        return (None, String::new());
    };
    OPPORTUNITY_LABELS
        .iter()
        .find(|(tag, _, _)| *tag == kind)
        .map(|&(_, icon, label)| (Some(icon), label.to_string()))
        .unwrap_or_else(|| (None, kind.to_string()))
}

pub fn render(report: &PredictionReport, header: ResultHeader) -> PredictionView {
    let summary = vec![
        SummaryCard::new("Weekly Cost", money(report.total_weekly_cost), "Next 7 days", Tone::Blue),
        SummaryCard::new("Potential Savings", money(report.total_savings()), "Weekly", Tone::Green),
        SummaryCard::new(
            "Optimization Opportunities",
            report.opportunities.len().to_string(),
            "Recommendations",
            Tone::Purple,
        ),
    ];

    let forecast = report
        .forecast
        .iter()
        .map(|day| ForecastRow {
            date: day.date.as_deref().map(short_date).unwrap_or_else(|| "N/A".to_string()),
            day: day
                .weekday
                .as_deref()
                .map(|w| take_chars(w, 3))
                .unwrap_or_else(|| "N/A".to_string()),
            cost: money(day.cost),
            cpu: Meter::percent(day.avg_cpu),
            memory: Meter::percent(day.avg_memory),
        })
        .collect();

    let trend = TrendBadge {
        trend: report.trend.clone(),
        label: format!("{} trend", report.trend),
        confidence: format!("{}%", to_fixed(report.confidence * 100.0, 0)),
    };

    let perf = &report.performance;
    let performance = PerformancePanel {
        peak_cpu: Meter::percent(perf.expected_peak_cpu),
        peak_memory: Meter::percent(perf.expected_peak_memory),
        risk: perf.bottleneck_risk.clone(),
        peak_time: perf
            .peak_time
            .as_deref()
            .and_then(clock_time)
            .map(|t| format!("Peak: {t}"))
            .unwrap_or_else(|| PEAK_TIME_UNAVAILABLE.to_string()),
    };

    let opportunities: Vec<OpportunityRow> = report
        .opportunities
        .iter()
        .map(|opp| {
            let (icon, label) = opportunity_label(opp.kind.as_deref());
            let pct = opp.confidence * 100.0;
            OpportunityRow {
                icon: icon.map(str::to_string),
                label,
                savings: money(opp.savings_potential),
                confidence: Meter {
                    fill: clamp_pct(pct),
                    label: format!("{}% confidence", to_fixed(pct, 0)),
                },
            }
        })
        .collect();

    let empty_note = opportunities
        .is_empty()
        .then(|| NO_OPPORTUNITIES.to_string());

    PredictionView {
        header,
        summary,
        forecast,
        trend,
        performance,
        opportunities,
        empty_note,
    }
}
