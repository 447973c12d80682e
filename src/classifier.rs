//! Keyword-based question classification.
//!
//! The keyword lists are data owned by the classifier, not inlined
//! conditionals, so tests and deployments can swap them without touching
//! the routing control flow.

use std::collections::BTreeSet;

use crate::models::Category;

/// Questions about numerical or analytical data in delimited tables.
const TABULAR_KEYWORDS: &[&str] = &[
    "most",
    "least",
    "total",
    "count",
    "budget",
    "department",
    "employee",
    "people",
    "staff",
    "performance",
    "rating",
    "largest",
    "smallest",
    "highest",
    "lowest",
    "how many",
];

/// Questions about onboarding and first-day procedures.
const ONBOARDING_KEYWORDS: &[&str] = &[
    "first day",
    "onboard",
    "new employee",
    "orientation",
    "checklist",
    "meet with",
    "security badge",
    "laptop",
    "manager",
    "office tour",
];

/// Questions about company policies.
const POLICY_KEYWORDS: &[&str] = &[
    "vacation",
    "time off",
    "sick leave",
    "holiday",
    "policy",
    "benefits",
    "days per year",
    "request",
    "approval",
];

/// Tags a question with zero or more topical categories.
///
/// Categories are not mutually exclusive. A question matching no keyword
/// list is tagged `generic`, which routes it through every specialized
/// extractor before the overlap fallback.
pub struct QuestionClassifier {
    rules: Vec<(Category, Vec<String>)>,
}

impl Default for QuestionClassifier {
    fn default() -> Self {
        Self::with_rules(vec![
            (Category::Tabular, owned(TABULAR_KEYWORDS)),
            (Category::Onboarding, owned(ONBOARDING_KEYWORDS)),
            (Category::Policy, owned(POLICY_KEYWORDS)),
        ])
    }
}

impl QuestionClassifier {
    /// Creates a classifier with the default keyword tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier with custom keyword tables.
    ///
    /// Keywords must be lowercase; questions are lowercased before matching.
    pub fn with_rules(rules: Vec<(Category, Vec<String>)>) -> Self {
        Self { rules }
    }

    /// Classifies a question into a set of categories.
    ///
    /// A category matches when any of its keywords occurs as a substring of
    /// the lowercased question. The returned set iterates in routing
    /// priority order.
    pub fn classify(&self, question: &str) -> BTreeSet<Category> {
        let question = question.to_lowercase();

        let mut matched: BTreeSet<Category> = self
            .rules
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|kw| question.contains(kw.as_str())))
            .map(|(category, _)| *category)
            .collect();

        if matched.is_empty() {
            matched.insert(Category::Generic);
        }

        matched
    }
}

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|kw| (*kw).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_question_classified_as_tabular() {
        let classifier = QuestionClassifier::new();
        let categories = classifier.classify("Which department has the most employees?");

        assert!(categories.contains(&Category::Tabular));
        assert!(!categories.contains(&Category::Generic));
    }

    #[test]
    fn onboarding_question_classified_as_onboarding() {
        let classifier = QuestionClassifier::new();
        let categories = classifier.classify("What happens at orientation?");

        assert!(categories.contains(&Category::Onboarding));
    }

    #[test]
    fn policy_question_classified_as_policy() {
        let classifier = QuestionClassifier::new();
        let categories = classifier.classify("How do I request time off?");

        assert!(categories.contains(&Category::Policy));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let classifier = QuestionClassifier::new();
        let categories = classifier.classify("VACATION rules?");

        assert!(categories.contains(&Category::Policy));
    }

    #[test]
    fn categories_are_not_mutually_exclusive() {
        let classifier = QuestionClassifier::new();
        // "manager" is an onboarding keyword, "approval" a policy keyword.
        let categories = classifier.classify("Does my manager need to give approval?");

        assert!(categories.contains(&Category::Onboarding));
        assert!(categories.contains(&Category::Policy));
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn unmatched_question_falls_back_to_generic() {
        let classifier = QuestionClassifier::new();
        let categories = classifier.classify("Tell me about the widget launch.");

        assert_eq!(categories.len(), 1);
        assert!(categories.contains(&Category::Generic));
    }

    #[test]
    fn matched_set_iterates_in_priority_order() {
        let classifier = QuestionClassifier::new();
        // Policy ("vacation") and tabular ("how many") both match.
        let categories = classifier.classify("How many vacation days do I get?");

        let ordered: Vec<Category> = categories.into_iter().collect();
        assert_eq!(ordered, vec![Category::Tabular, Category::Policy]);
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let classifier = QuestionClassifier::with_rules(vec![(
            Category::Policy,
            vec!["reimbursement".to_string()],
        )]);

        let categories = classifier.classify("What is the reimbursement policy?");
        assert!(categories.contains(&Category::Policy));

        // Default keyword lists are gone.
        let categories = classifier.classify("Which department has the most staff?");
        assert!(categories.contains(&Category::Generic));
    }
}
