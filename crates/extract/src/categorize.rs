use docsort_models::Category;

/// Ordered keyword rules; the first rule with a keyword occurring anywhere in
/// the text wins. Matching is by substring, so "paid" hits the `id` keyword.
pub const RULES: &[(Category, &[&str])] = &[
    (Category::Bill, &["invoice", "gst", "amount", "total"]),
    (Category::IdDocument, &["prn", "roll", "student", "id"]),
    (Category::Notes, &["assignment", "lecture", "subject", "class"]),
    (Category::Certificate, &["certificate", "award", "completion"]),
];

pub fn categorize(clean_text: &str) -> Category {
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| clean_text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Uncategorized)
}
