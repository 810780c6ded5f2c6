use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod mailbox;

pub const NAME_MAX: usize = 100;
pub const SUBJECT_MAX: usize = 150;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 5000;

/// Fields posted by the contact form. `website` is a honeypot hidden from people.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub website: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Error messages keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, PartialEq)]
pub enum Submission {
    Accepted(ContactMessage),
    /// A bot filled the honeypot. Answered like a success, never stored.
    Discarded,
    Rejected(ContactForm, FieldErrors),
}

fn is_email(value: &str) -> bool {
    lazy_static! {
        static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap();
    }
    EMAIL_REGEX.is_match(value)
}

impl ContactForm {
    pub fn trimmed(&self) -> ContactForm {
        ContactForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            website: self.website.trim().to_string(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let name_len = self.name.chars().count();
        if name_len == 0 {
            errors.insert("name", "Please tell me your name.".to_string());
        } else if name_len > NAME_MAX {
            errors.insert("name", format!("Name must have at most {} characters.", NAME_MAX));
        }

        if self.email.is_empty() {
            errors.insert("email", "An email address is needed to reply.".to_string());
        } else if !is_email(&self.email) {
            errors.insert("email", "This does not look like an email address.".to_string());
        }

        if self.subject.chars().count() > SUBJECT_MAX {
            errors.insert("subject", format!("Subject must have at most {} characters.", SUBJECT_MAX));
        }

        let message_len = self.message.chars().count();
        if message_len < MESSAGE_MIN {
            errors.insert("message", format!("Message must have at least {} characters.", MESSAGE_MIN));
        } else if message_len > MESSAGE_MAX {
            errors.insert("message", format!("Message must have at most {} characters.", MESSAGE_MAX));
        }

        errors
    }

    pub fn submit(&self) -> Submission {
        let form = self.trimmed();
        if !form.website.is_empty() {
            return Submission::Discarded;
        }

        let errors = form.validate();
        if !errors.is_empty() {
            return Submission::Rejected(form, errors);
        }

        Submission::Accepted(ContactMessage {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
        })
    }
}
