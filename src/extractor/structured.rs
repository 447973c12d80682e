//! Rule-table extraction from structured prose documents.
//!
//! Each category owns a prioritized table of (trigger keywords, pattern,
//! answer template) rules. A rule fires only when every trigger keyword is
//! present in the question AND its pattern matches a candidate document's
//! content. The first firing rule in table order wins; its capture groups
//! are substituted into the answer template.

use regex::{Regex, RegexBuilder};

use crate::models::{AnswerResult, Document, ExtractorKind};

use super::Extractor;

const CONFIDENCE: f32 = 0.8;

/// One extraction rule: trigger keywords, a content pattern, and an
/// answer template with `{1}`, `{2}`, ... capture placeholders.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    triggers: Vec<&'static str>,
    pattern: Regex,
    template: &'static str,
}

impl ExtractionRule {
    /// Creates a rule. The pattern is compiled case-insensitively.
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not compile; rule tables are built from
    /// literals at construction time.
    pub fn new(triggers: &[&'static str], pattern: &str, template: &'static str) -> Self {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("rule pattern must compile");
        Self {
            triggers: triggers.to_vec(),
            pattern,
            template,
        }
    }

    /// True when every trigger keyword occurs in the lowercased question.
    fn triggered_by(&self, question: &str) -> bool {
        self.triggers.iter().all(|trigger| question.contains(trigger))
    }
}

/// Answers questions from structured prose via an ordered rule table.
pub struct StructuredTextExtractor {
    rules: Vec<ExtractionRule>,
}

impl StructuredTextExtractor {
    /// Creates an extractor with the onboarding rule table: who to meet,
    /// first-day checklist, report time, security badge, equipment,
    /// training.
    pub fn onboarding() -> Self {
        Self::with_rules(onboarding_rules())
    }

    /// Creates an extractor with the policy rule table: vacation
    /// entitlement, consecutive-day limits, request procedure, carry-over,
    /// sick leave.
    pub fn policy() -> Self {
        Self::with_rules(policy_rules())
    }

    /// Creates an extractor with a custom rule table.
    pub fn with_rules(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }
}

impl Extractor for StructuredTextExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::StructuredText
    }

    fn attempt(&self, question: &str, documents: &[&Document]) -> Option<AnswerResult> {
        let question = question.to_lowercase();

        for rule in &self.rules {
            if !rule.triggered_by(&question) {
                continue;
            }
            for document in documents {
                if let Some(captures) = rule.pattern.captures(&document.content) {
                    let answer = apply_template(rule.template, &captures);
                    return Some(AnswerResult::new(
                        answer,
                        Some(document.filename.clone()),
                        CONFIDENCE,
                        ExtractorKind::StructuredText,
                    ));
                }
            }
        }

        None
    }
}

/// Substitutes `{n}` placeholders with the corresponding capture groups.
fn apply_template(template: &str, captures: &regex::Captures<'_>) -> String {
    let mut answer = template.to_string();
    for index in 1..captures.len() {
        if let Some(capture) = captures.get(index) {
            answer = answer.replace(&format!("{{{index}}}"), capture.as_str().trim());
        }
    }
    answer
}

fn onboarding_rules() -> Vec<ExtractionRule> {
    vec![
        ExtractionRule::new(
            &["meet"],
            r"meet with your direct manager",
            "You should meet with your direct manager on your first day.",
        ),
        ExtractionRule::new(
            &["checklist"],
            r"first day checklist[^\n]*\n\s*[-*]\s*(.+)",
            "First on the checklist: {1}.",
        ),
        ExtractionRule::new(
            &["first", "day"],
            r"first day checklist[^\n]*\n\s*[-*]\s*(.+)",
            "First on the checklist: {1}.",
        ),
        ExtractionRule::new(
            &["report"],
            r"report to hr at (\d{1,2}:\d{2}\s*[ap]m)",
            "Report to HR at {1} for orientation.",
        ),
        ExtractionRule::new(
            &["orientation"],
            r"report to hr at (\d{1,2}:\d{2}\s*[ap]m)",
            "Report to HR at {1} for orientation.",
        ),
        ExtractionRule::new(
            &["badge"],
            r"security badge",
            "You will receive your security badge during the office tour on your first day.",
        ),
        ExtractionRule::new(
            &["laptop"],
            r"company laptop",
            "You will receive your company laptop and access credentials on your first day.",
        ),
        ExtractionRule::new(
            &["equipment"],
            r"company laptop",
            "You will receive your company laptop and access credentials on your first day.",
        ),
        ExtractionRule::new(
            &["training"],
            r"training requirements[^\n]*\n\s*[-*]\s*(.+)",
            "Required training includes {1}.",
        ),
    ]
}

fn policy_rules() -> Vec<ExtractionRule> {
    vec![
        ExtractionRule::new(
            &["vacation", "new"],
            r"new employees?:?\s*(\d+)\s*days?\s*per\s*year",
            "New employees get {1} vacation days per year.",
        ),
        ExtractionRule::new(
            &["consecutive"],
            r"(\d+)\s*consecutive\s*(?:vacation\s*)?days?",
            "A maximum of {1} consecutive vacation days may be taken without special approval.",
        ),
        ExtractionRule::new(
            &["maximum"],
            r"maximum\s*of\s*(\d+)\s*consecutive\s*(?:vacation\s*)?days?",
            "A maximum of {1} consecutive vacation days may be taken without special approval.",
        ),
        ExtractionRule::new(
            &["request"],
            r"(\d+)\s*weeks?\s*in\s*advance",
            "Submit requests through the HR portal at least {1} weeks in advance.",
        ),
        ExtractionRule::new(
            &["request"],
            r"hr portal",
            "Submit vacation requests through the HR portal for manager approval.",
        ),
        ExtractionRule::new(
            &["carry"],
            r"cannot be carried over",
            "Vacation days cannot be carried over to the next year.",
        ),
        ExtractionRule::new(
            &["sick"],
            r"(\d+)\s*sick\s*days?",
            "Employees receive {1} sick days per year, separate from vacation time.",
        ),
        ExtractionRule::new(
            &["vacation", "days"],
            r"(\d+)\s*days?\s*per\s*year",
            "The vacation entitlement is {1} days per year.",
        ),
    ]
}
