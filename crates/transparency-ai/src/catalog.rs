//! Static questionnaire content.
//!
//! Every product gets the base questions; product categories with extra concerns
//! (nutrition, cruelty-free testing, dosage...) append their own set.

use transparency_common::api::Question;

/// `(id, question, scoring category)`
type Entry = (&'static str, &'static str, &'static str);

const BASE: &[Entry] = &[
    (
        "ingredients",
        "What are the main ingredients or components?",
        "composition",
    ),
    ("allergens", "Does this product contain any allergens?", "health"),
    ("origin", "Where is this product manufactured?", "origin"),
    (
        "certifications",
        "List any certifications (Organic, Fair Trade, etc.)",
        "ethics",
    ),
];

const FOOD: &[Entry] = &[
    ("nutrition", "Provide key nutritional information", "health"),
    ("preservatives", "List any preservatives or additives", "health"),
    ("expiry", "What is the typical shelf life?", "storage"),
];

const BEVERAGE: &[Entry] = &[
    ("sugar", "Sugar content per serving?", "health"),
    ("artificial", "Any artificial ingredients?", "health"),
];

const COSMETICS: &[Entry] = &[
    ("testing", "Is this product cruelty-free?", "ethics"),
    (
        "chemicals",
        "List potentially harmful chemicals (if any)",
        "health",
    ),
];

const SUPPLEMENTS: &[Entry] = &[
    ("clinical", "Has this undergone clinical testing?", "health"),
    ("dosage", "Recommended dosage and warnings?", "health"),
];

fn to_questions(entries: &[Entry]) -> Vec<Question> {
    entries
        .iter()
        .map(|(id, question, category)| Question::text(id, question, category))
        .collect()
}

pub fn base_questions() -> Vec<Question> {
    to_questions(BASE)
}

/// Extra questions for a product category. Lookup is exact and case-sensitive;
/// unknown categories get none.
pub fn category_questions(category: &str) -> Vec<Question> {
    let entries = match category {
        "Food" => FOOD,
        "Beverage" => BEVERAGE,
        "Cosmetics" => COSMETICS,
        "Supplements" => SUPPLEMENTS,
        _ => &[],
    };
    to_questions(entries)
}

/// Base questions followed by the category's own, in declaration order.
pub fn questionnaire(category: &str) -> Vec<Question> {
    let mut questions = base_questions();
    questions.extend(category_questions(category));
    questions
}
