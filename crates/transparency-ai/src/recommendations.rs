/// Suggestions returned when nothing has been answered yet.
pub const EMPTY_RESPONSES: &str = "Add product information to get a transparency score";

const EXCELLENT: &[&str] = &[
    "Excellent transparency! Share this with customers",
    "Consider publishing detailed supply chain information",
    "Add third-party verification for even more credibility",
];

const GOOD: &[&str] = &[
    "Good transparency foundation",
    "Add more detailed ingredient sourcing information",
    "Include quality control and testing procedures",
    "Consider adding sustainability metrics",
];

const MODERATE: &[&str] = &[
    "Moderate transparency - needs improvement",
    "Provide complete ingredient lists with sources",
    "Add manufacturing process details",
    "Include all relevant certifications",
    "Answer all health and safety questions thoroughly",
];

const LOW: &[&str] = &[
    "Low transparency - immediate action needed",
    "Complete all required product information",
    "Provide detailed answers (50+ characters each)",
    "Add certifications and testing results",
    "Include sourcing and manufacturing details",
    "Address all health and safety concerns",
];

/// Fixed advice for the bracket the transparency score falls in.
pub fn basic_recommendations(score: u8) -> Vec<String> {
    let copy = match score {
        80.. => EXCELLENT,
        60..=79 => GOOD,
        40..=59 => MODERATE,
        _ => LOW,
    };
    copy.iter().map(|s| s.to_string()).collect()
}
