//! Entity Extractor: pulls contact details (name, email) out of résumé text.
//!
//! `RegexEntityExtractor` is a heuristic, not named-entity recognition:
//! - email: every `\S+@\S+` run, top to bottom; the first one is the candidate's email.
//! - name: only when the text opens with two Title-Case words on its first line
//!   ("Jane Doe ..."). Names anywhere else are missed, and any other two-word
//!   Title-Case opener ("New York", "Curriculum Vitae") is taken as a name.
//!
//! Swap in a real NER backend by implementing `EntityExtractor`; `AppState` holds an
//! `Arc<dyn EntityExtractor>`.

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub emails: Vec<String>,
    pub names: Vec<String>,
}

pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Entities;
}

pub struct RegexEntityExtractor {
    email_regex: Regex,
    name_regex: Regex,
}

impl Default for RegexEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexEntityExtractor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"\S+@\S+").expect("Invalid email regex");
        // Anchored at the start of the text, not of each line.
        let name_regex =
            Regex::new(r"^([A-Z][a-z]+)[ \t]+([A-Z][a-z]+)").expect("Invalid name regex");

        Self {
            email_regex,
            name_regex,
        }
    }
}

impl EntityExtractor for RegexEntityExtractor {
    fn extract(&self, text: &str) -> Entities {
        let emails = self
            .email_regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let names = self
            .name_regex
            .captures(text)
            .map(|caps| vec![format!("{} {}", &caps[1], &caps[2])])
            .unwrap_or_default();

        Entities { emails, names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Entities {
        RegexEntityExtractor::new().extract(text)
    }

    #[test]
    fn test_name_and_email() {
        let entities = extract("John Smith\njohn.smith@example.com");
        assert_eq!(entities.names, vec!["John Smith"]);
        assert_eq!(entities.emails, vec!["john.smith@example.com"]);
    }

    #[test]
    fn test_no_entities() {
        let entities = extract("quarterly report\nno names here");
        assert!(entities.names.is_empty());
        assert!(entities.emails.is_empty());
    }

    #[test]
    fn test_emails_in_document_order() {
        let entities = extract("Contact: first@a.io\nBackup: second@b.io");
        assert_eq!(entities.emails, vec!["first@a.io", "second@b.io"]);
    }

    #[test]
    fn test_name_must_open_the_text() {
        let entities = extract("Resume\nJohn Smith");
        assert!(entities.names.is_empty());

        let entities = extract("  John Smith");
        assert!(entities.names.is_empty());
    }

    #[test]
    fn test_name_does_not_span_lines() {
        let entities = extract("John\nSmith");
        assert!(entities.names.is_empty());
    }

    #[test]
    fn test_name_requires_title_case() {
        assert!(extract("JOHN SMITH").names.is_empty());
        assert!(extract("john smith").names.is_empty());
    }

    #[test]
    fn test_known_misfire_on_place_names() {
        let entities = extract("New York based engineer");
        assert_eq!(entities.names, vec!["New York"]);
    }

    #[test]
    fn test_third_title_case_word_is_ignored() {
        let entities = extract("Mary Jane Watson\nmj@dailybugle.com");
        assert_eq!(entities.names, vec!["Mary Jane"]);
    }
}
