//! Waste-detection result → display structure.

use std::cmp::Ordering;

use serde::Serialize;

use super::format::{clamp_pct, money, parse_timestamp, plain_number, short_date_time, to_fixed};
use super::{Meter, ResultHeader, SummaryCard, Tone};
use crate::model::WasteReport;
use crate::model::waste::IdlePeriod;

/// Most idle periods listed in the table.
pub const IDLE_ROW_LIMIT: usize = 10;

/// Decorative icons for the first four recommendations; later ones share
/// [`DEFAULT_RECOMMENDATION_ICON`].
const RECOMMENDATION_ICONS: [&str; 4] = ["💡", "⚡", "📈", "💰"];
const DEFAULT_RECOMMENDATION_ICON: &str = "✅";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteView {
    pub header: ResultHeader,
    pub summary: Vec<SummaryCard>,
    pub idle: IdleTable,
    pub analysis: WasteAnalysisPanel,
    pub recommendations: Vec<RecommendationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdleTable {
    /// `12 periods totaling $3.50 in wasted cost`
    pub subtitle: String,
    pub rows: Vec<IdleRow>,
    /// `+2 more idle periods detected` when rows were cut.
    pub overflow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdleRow {
    pub start: String,
    pub end: String,
    pub duration: String,
    pub cpu: Meter,
    pub memory: Meter,
    pub wasted_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteAnalysisPanel {
    /// Underutilization score on a 0–1 scale, two decimals.
    pub score: Meter,
    pub waste_percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub icon: String,
    pub text: String,
}

pub fn recommendation_icon(position: usize) -> &'static str {
    RECOMMENDATION_ICONS
        .get(position)
        .copied()
        .unwrap_or(DEFAULT_RECOMMENDATION_ICON)
}

/// Idle periods newest-first by start. Periods whose start is missing or
/// unparsable go last, in their original order.
pub fn sort_idle_periods(periods: &[IdlePeriod]) -> Vec<&IdlePeriod> {
    let mut keyed: Vec<_> = periods
        .iter()
        .map(|p| (p.start.as_deref().and_then(parse_timestamp), p))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    keyed.into_iter().map(|(_, p)| p).collect()
}

pub fn render(report: &WasteReport, header: ResultHeader) -> WasteView {
    let total_waste = report.total_waste();
    let count = report.idle_periods.len();

    let summary = vec![
        SummaryCard::new(
            "Monthly Savings",
            money(report.estimated_monthly_savings),
            "Potential",
            Tone::Green,
        ),
        SummaryCard::new(
            "Waste Percentage",
            format!("{}%", to_fixed(report.total_waste_percentage, 1)),
            "Of total usage",
            Tone::Orange,
        ),
        SummaryCard::new(
            "Idle Periods",
            count.to_string(),
            format!("{} total hours", plain_number(report.total_hours())),
            Tone::Red,
        ),
    ];

    let rows = sort_idle_periods(&report.idle_periods)
        .into_iter()
        .take(IDLE_ROW_LIMIT)
        .map(idle_row)
        .collect();

    let idle = IdleTable {
        subtitle: format!("{count} periods totaling {} in wasted cost", money(total_waste)),
        rows,
        overflow: (count > IDLE_ROW_LIMIT)
            .then(|| format!("+{} more idle periods detected", count - IDLE_ROW_LIMIT)),
    };

    let score = report.underutilized_score;
    let analysis = WasteAnalysisPanel {
        score: Meter {
            fill: clamp_pct(score * 100.0),
            label: to_fixed(score, 2),
        },
        waste_percentage: format!("{}%", to_fixed(report.total_waste_percentage, 1)),
    };

    let recommendations = report
        .recommendations
        .iter()
        .enumerate()
        .map(|(i, text)| RecommendationRow {
            icon: recommendation_icon(i).to_string(),
            text: text.clone(),
        })
        .collect();

    WasteView {
        header,
        summary,
        idle,
        analysis,
        recommendations,
    }
}

fn idle_row(period: &IdlePeriod) -> IdleRow {
    IdleRow {
        start: short_date_time(period.start.as_deref()),
        end: short_date_time(period.end.as_deref()),
        duration: format!(
            "{}h",
            period.duration_hours.map(plain_number).unwrap_or_default()
        ),
        cpu: usage_meter(period.avg_cpu),
        memory: usage_meter(period.avg_memory),
        wasted_cost: money(period.wasted_cost),
    }
}

/// An absent reading shows as `0%`, a present one with one decimal.
fn usage_meter(value: Option<f64>) -> Meter {
    match value {
        Some(v) => Meter::percent(v),
        None => Meter {
            fill: 0.0,
            label: "0%".to_string(),
        },
    }
}
