use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EMAIL_FIELD: &str = "email";

/// A single address book entry.
///
/// `id == 0` means the contact has not been stored yet; [`crate::ContactStore::save`]
/// allocates an identifier for it. `errors` carries per-field validation messages for
/// display and is never written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(rename = "ID")]
    pub id: u64,
    pub first: String,
    pub last: String,
    pub phone: String,
    pub email: String,
    #[serde(skip)]
    pub errors: BTreeMap<String, String>,
}

impl Contact {
    pub fn new(
        first: impl Into<String>,
        last: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first: first.into(),
            last: last.into(),
            phone: phone.into(),
            email: email.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Validation message for `field`, or an empty string.
    pub fn error(&self, field: &str) -> &str {
        self.errors.get(field).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        self.first.contains(text)
            || self.last.contains(text)
            || self.email.contains(text)
            || self.phone.contains(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_without_errors() {
        let mut contact = Contact::new("Ada", "Lovelace", "555-0100", "ada@example.com");
        contact.id = 7;
        contact
            .errors
            .insert(EMAIL_FIELD.to_string(), "Email is required".to_string());

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["ID"], 7);
        assert_eq!(json["First"], "Ada");
        assert_eq!(json["Email"], "ada@example.com");
        assert!(json.get("Errors").is_none());
    }

    #[test]
    fn ignores_persisted_errors_field() {
        let raw = r#"{"ID":3,"First":"a","Last":"b","Phone":"c","Email":"d","Errors":{"email":"x"}}"#;
        let contact: Contact = serde_json::from_str(raw).unwrap();
        assert_eq!(contact.id, 3);
        assert!(!contact.has_errors());
    }

    #[test]
    fn search_match_is_case_sensitive_substring() {
        let contact = Contact::new("Grace", "Hopper", "555-0199", "grace@navy.mil");
        assert!(contact.matches("race"));
        assert!(contact.matches("0199"));
        assert!(contact.matches("navy"));
        assert!(!contact.matches("grace h"));
        assert!(!contact.matches("HOPPER"));
    }
}
