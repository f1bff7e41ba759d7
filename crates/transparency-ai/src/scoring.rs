//! Transparency scoring.
//!
//! The composite score weights completeness (50%) over answer depth (30%) over
//! health/ethics coverage (20%).

use transparency_common::api::ProductResponse;

use crate::recommendations::{self, EMPTY_RESPONSES};

/// Score for a category nobody was asked about.
pub const NEUTRAL_CATEGORY_SCORE: u8 = 50;

pub const HEALTH: &str = "health";
pub const ETHICS: &str = "ethics";

pub const NO_DATA_ANALYSIS: &str = "No data available for analysis";
pub const STANDARD_ANALYSIS: &str = "Standard analysis completed";

const COMPLETENESS_WEIGHT: f64 = 0.5;
const QUALITY_WEIGHT: f64 = 0.3;
const CATEGORY_WEIGHT: f64 = 0.2;
const MAX_POINTS_PER_ANSWER: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub transparency: u8,
    pub health: u8,
    pub ethics: u8,
    pub recommendations: Vec<String>,
    pub analysis: String,
}

/// Share of answered responses within one category, as a 0–100 percentage.
pub fn category_score(responses: &[ProductResponse], category: &str) -> u8 {
    let (answered, total) = responses
        .iter()
        .filter(|r| r.category == category)
        .fold((0usize, 0usize), |(answered, total), r| {
            (answered + usize::from(r.is_answered()), total + 1)
        });
    if total == 0 {
        return NEUTRAL_CATEGORY_SCORE;
    }
    to_score((answered as f64 / total as f64 * 100.0).round())
}

/// Depth points for one answer. Thresholds are strict and counted in characters.
pub fn answer_points(response: &ProductResponse) -> u32 {
    match response.trimmed_answer().chars().count() {
        n if n > 100 => 3,
        n if n > 50 => 2,
        n if n > 10 => 1,
        _ => 0,
    }
}

pub fn completeness(responses: &[ProductResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let answered = responses.iter().filter(|r| r.is_answered()).count();
    answered as f64 / responses.len() as f64 * 100.0
}

pub fn quality(responses: &[ProductResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let points: u32 = responses.iter().map(answer_points).sum();
    let max_points = responses.len() as f64 * MAX_POINTS_PER_ANSWER as f64;
    (points as f64 / max_points * 100.0).min(100.0)
}

/// Score a set of responses without consulting the model.
pub fn score_responses(responses: &[ProductResponse]) -> ScoreBreakdown {
    if responses.is_empty() {
        return ScoreBreakdown {
            transparency: 0,
            health: 0,
            ethics: 0,
            recommendations: vec![EMPTY_RESPONSES.to_string()],
            analysis: NO_DATA_ANALYSIS.to_string(),
        };
    }

    let health = category_score(responses, HEALTH);
    let ethics = category_score(responses, ETHICS);
    let coverage = (f64::from(health) + f64::from(ethics)) / 2.0;

    let weighted = completeness(responses) * COMPLETENESS_WEIGHT
        + quality(responses) * QUALITY_WEIGHT
        + coverage * CATEGORY_WEIGHT;
    let transparency = to_score(weighted.trunc());

    ScoreBreakdown {
        transparency,
        health,
        ethics,
        recommendations: recommendations::basic_recommendations(transparency),
        analysis: STANDARD_ANALYSIS.to_string(),
    }
}

fn to_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}
