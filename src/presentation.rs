use std::fmt::Write;

use crate::models::{PredictionResult, RiskColor, RiskLevel};
use crate::state::{FormState, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskIcon {
    Success,
    Info,
    Warning,
    Error,
}

impl RiskIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            RiskIcon::Success => "[✓]",
            RiskIcon::Info => "[i]",
            RiskIcon::Warning => "[!]",
            RiskIcon::Error => "[✗]",
        }
    }
}

pub fn risk_icon(level: &RiskLevel) -> RiskIcon {
    match level {
        RiskLevel::Low => RiskIcon::Success,
        RiskLevel::Moderate => RiskIcon::Info,
        RiskLevel::High => RiskIcon::Warning,
        RiskLevel::Critical => RiskIcon::Error,
        RiskLevel::Other(_) => RiskIcon::Info,
    }
}

pub fn risk_color_class(color: &RiskColor) -> &'static str {
    match color {
        RiskColor::Green => "bg-green-100 text-green-800 border-green-300",
        RiskColor::Orange => "bg-orange-100 text-orange-800 border-orange-300",
        RiskColor::Red => "bg-red-100 text-red-800 border-red-300",
        RiskColor::Yellow | RiskColor::Other(_) => "bg-yellow-100 text-yellow-800 border-yellow-300",
    }
}

/// `attendanceScore` -> `attendance Score`
pub fn format_breakdown_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            label.push(' ');
        }
        label.push(c);
    }
    label.trim().to_string()
}

/// Plain-text result card.
pub fn render_result(result: &PredictionResult) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} {} - {}",
        risk_icon(&result.risk_level).glyph(),
        result.risk_level,
        result.status
    );
    let _ = writeln!(output, "Performance Score: {}", result.score);
    let _ = writeln!(output);
    let _ = writeln!(output, "Score Breakdown");
    for (key, value) in &result.breakdown {
        let _ = writeln!(output, "  {:<20} {}", format_breakdown_key(key), value);
    }

    if !result.insights.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Key Insights");
        for insight in &result.insights {
            let _ = writeln!(output, "  {insight}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Recommendations");
    for (index, recommendation) in result.recommendations.iter().enumerate() {
        let _ = writeln!(output, "  {}. {}", index + 1, recommendation);
    }

    output
}

pub fn render_state(state: &FormState) -> String {
    match (state.phase(), &state.result, &state.error) {
        (Phase::Loading, _, _) => "Analyzing...\n".to_string(),
        (Phase::Error, _, Some(message)) => format!("{message}\n"),
        (Phase::Success, Some(result), _) => render_result(result),
        _ => "Ready to Analyze\nEnter student information and submit to get detailed insights and recommendations.\n"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scenario_result() -> PredictionResult {
        PredictionResult {
            risk_level: RiskLevel::Low,
            color: RiskColor::Green,
            status: "On Track".to_string(),
            score: 87.0,
            breakdown: BTreeMap::from([("attendanceScore".to_string(), 95.0)]),
            insights: vec![],
            recommendations: vec!["Keep it up".to_string()],
        }
    }

    #[test]
    fn icons_follow_risk_tiers() {
        assert_eq!(risk_icon(&RiskLevel::Low), RiskIcon::Success);
        assert_eq!(risk_icon(&RiskLevel::Moderate), RiskIcon::Info);
        assert_eq!(risk_icon(&RiskLevel::High), RiskIcon::Warning);
        assert_eq!(risk_icon(&RiskLevel::Critical), RiskIcon::Error);
    }

    #[test]
    fn unknown_risk_level_uses_default_icon() {
        for label in ["", "low risk", "Extreme Risk"] {
            let level = RiskLevel::from(label.to_string());
            assert_eq!(risk_icon(&level), RiskIcon::Info);
        }
    }

    #[test]
    fn unknown_color_falls_back_to_yellow() {
        let yellow = risk_color_class(&RiskColor::Yellow);
        for name in ["purple", "", "GREEN", "Red"] {
            assert_eq!(risk_color_class(&RiskColor::from(name.to_string())), yellow);
        }
        assert_ne!(risk_color_class(&RiskColor::Green), yellow);
        assert_eq!(
            risk_color_class(&RiskColor::Red),
            "bg-red-100 text-red-800 border-red-300"
        );
    }

    #[test]
    fn breakdown_keys_are_split_on_capitals() {
        assert_eq!(format_breakdown_key("attendanceScore"), "attendance Score");
        assert_eq!(format_breakdown_key("labWork"), "lab Work");
        assert_eq!(format_breakdown_key("exams"), "exams");
        assert_eq!(format_breakdown_key("MidSemAvg"), "Mid Sem Avg");
        assert_eq!(format_breakdown_key(""), "");
    }

    #[test]
    fn card_shows_score_and_numbered_recommendations() {
        let card = render_result(&scenario_result());
        assert!(card.contains("Performance Score: 87\n"));
        assert!(card.contains("attendance Score"));
        assert!(card.contains("  1. Keep it up"));
        assert!(!card.contains("  2. "));
        assert!(!card.contains("Key Insights"));
    }

    #[test]
    fn insights_section_appears_when_present() {
        let mut result = scenario_result();
        result.insights = vec!["Low attendance".to_string()];
        assert!(render_result(&result).contains("Key Insights\n  Low attendance"));
    }

    #[test]
    fn idle_state_renders_placeholder() {
        assert!(render_state(&FormState::new()).starts_with("Ready to Analyze"));
    }
}
