/// Email templates and the in-memory template library.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{validate_template, TemplateFields, ValidationLimits, ValidationReport};

/// Template category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailCategory {
    Work,
    Personal,
    Formal,
    Notification,
}

impl EmailCategory {
    pub const ALL: [EmailCategory; 4] = [Self::Work, Self::Personal, Self::Formal, Self::Notification];

    /// Identifier used in files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Formal => "formal",
            Self::Notification => "notification",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "Work email",
            Self::Personal => "Personal email",
            Self::Formal => "Formal email",
            Self::Notification => "Notification email",
        }
    }
}

impl fmt::Display for EmailCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}' (expected work, personal, formal or notification)"))
    }
}

/// A reusable email: subject line plus HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: u32,
    pub name: String,
    pub title: String,
    pub content: String,
    pub category: EmailCategory,
    /// Language code, see [`crate::language`].
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl EmailTemplate {
    pub fn fields(&self) -> TemplateFields<'_> {
        TemplateFields {
            name: &self.name,
            title: &self.title,
            content: &self.content,
            category: Some(self.category),
        }
    }
}

/// Ordered collection of templates with unique ids.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<EmailTemplate>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates shipped with the editor.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&EmailTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmailTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn by_category(&self, category: EmailCategory) -> impl Iterator<Item = &EmailTemplate> {
        self.templates.iter().filter(move |t| t.category == category)
    }

    /// Case-insensitive match over name, title and tags.
    pub fn search(&self, query: &str) -> Vec<&EmailTemplate> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.templates.iter().collect();
        }
        self.templates
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&needle)
                    || t.title.to_lowercase().contains(&needle)
                    || t.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Validates `template` and stores it under the next free id.
    ///
    /// # Errors
    ///
    /// Returns the validation report when any field is invalid.
    pub fn add(
        &mut self,
        mut template: EmailTemplate,
        limits: &ValidationLimits,
    ) -> Result<u32, ValidationReport> {
        let report = validate_template(&template.fields(), limits);
        if !report.is_valid() {
            return Err(report);
        }
        template.id = self.templates.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        tracing::debug!("Added template {} '{}'", template.id, template.name);
        let id = template.id;
        self.templates.push(template);
        Ok(id)
    }

    /// Removes a template. Returns it if it existed.
    pub fn remove(&mut self, id: u32) -> Option<EmailTemplate> {
        let index = self.templates.iter().position(|t| t.id == id)?;
        Some(self.templates.remove(index))
    }
}

const BODY_STYLE: &str = "font-family: Arial, sans-serif; line-height: 1.6;";

fn builtin_templates() -> Vec<EmailTemplate> {
    vec![
        EmailTemplate {
            id: 1,
            name: "Meeting invitation".to_string(),
            title: "[Meeting] Weekly project sync".to_string(),
            content: format!(
                "<div style=\"{BODY_STYLE}\">\
                 <p>Dear team,</p>\
                 <p>Our weekly project sync is scheduled for tomorrow at 14:00. Please be on time.</p>\
                 <p><strong>Agenda:</strong></p>\
                 <ul style=\"margin: 10px 0; padding-left: 20px;\">\
                 <li>Progress review</li><li>Open issues</li><li>Plan for next week</li>\
                 </ul>\
                 <p>See you there!</p></div>"
            ),
            category: EmailCategory::Work,
            language: "en".to_string(),
            tags: vec!["meeting".to_string(), "team".to_string()],
            is_active: true,
            description: Some("Invite the team to a recurring meeting".to_string()),
        },
        EmailTemplate {
            id: 2,
            name: "Greeting".to_string(),
            title: "Warm regards".to_string(),
            content: format!(
                "<div style=\"{BODY_STYLE}\">\
                 <p style=\"margin-bottom: 16px;\">Dear colleague,</p>\
                 <p style=\"margin-bottom: 16px;\">I hope this email finds you well.</p>\
                 <p style=\"margin-bottom: 16px;\">Wishing you every success in your work and good health!</p>\
                 <div style=\"margin-top: 24px; color: #666;\">\
                 <p style=\"margin-bottom: 8px;\">Best regards,</p></div></div>"
            ),
            category: EmailCategory::Personal,
            language: "en".to_string(),
            tags: vec!["greeting".to_string()],
            is_active: true,
            description: None,
        },
        EmailTemplate {
            id: 3,
            name: "Notice".to_string(),
            title: "Important notice".to_string(),
            content: format!(
                "<div style=\"{BODY_STYLE}\">\
                 <p style=\"margin-bottom: 16px;\">Dear all,</p>\
                 <p style=\"margin-bottom: 16px;\">Please note the following:</p>\
                 <div style=\"background-color: #f8f9fa; padding: 16px; border-radius: 4px; margin: 16px 0;\">\
                 <p style=\"margin-bottom: 8px;\">1. Everyone concerned, please read and follow the instructions.</p>\
                 <p style=\"margin-bottom: 0;\">2. Reach out with any questions.</p></div>\
                 <p style=\"color: #666; font-size: 14px; margin-top: 24px; text-align: right;\">\
                 This notice was sent automatically.</p></div>"
            ),
            category: EmailCategory::Notification,
            language: "en".to_string(),
            tags: vec!["notice".to_string(), "announcement".to_string()],
            is_active: true,
            description: Some("Company-wide announcement".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(name: &str) -> EmailTemplate {
        EmailTemplate {
            id: 0,
            name: name.to_string(),
            title: "Quarterly report".to_string(),
            content: "<p>Numbers are in.</p>".to_string(),
            category: EmailCategory::Formal,
            language: "en".to_string(),
            tags: vec!["report".to_string()],
            is_active: true,
            description: None,
        }
    }

    #[test]
    fn test_builtin_templates_are_valid() {
        let library = TemplateLibrary::builtin();
        assert_eq!(library.len(), 3);
        for template in library.iter() {
            let report = validate_template(&template.fields(), &ValidationLimits::default());
            assert!(report.is_valid(), "{}: {report}", template.name);
        }
    }

    #[test]
    fn test_get_and_by_category() {
        let library = TemplateLibrary::builtin();
        assert_eq!(library.get(2).map(|t| t.name.as_str()), Some("Greeting"));
        assert!(library.get(99).is_none());
        assert_eq!(library.by_category(EmailCategory::Work).count(), 1);
        assert_eq!(library.by_category(EmailCategory::Formal).count(), 0);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let library = TemplateLibrary::builtin();
        let hits: Vec<u32> = library.search("MEETING").iter().map(|t| t.id).collect();
        assert_eq!(hits, vec![1]);
        assert_eq!(library.search("announcement").len(), 1);
        assert_eq!(library.search("  ").len(), 3);
        assert!(library.search("nothing like this").is_empty());
    }

    #[test]
    fn test_add_assigns_next_id() {
        let mut library = TemplateLibrary::builtin();
        let id = library.add(custom("Report"), &ValidationLimits::default()).expect("valid");
        assert_eq!(id, 4);
        assert_eq!(library.get(4).map(|t| t.name.as_str()), Some("Report"));

        library.remove(4);
        let id = library.add(custom("Again"), &ValidationLimits::default()).expect("valid");
        assert_eq!(id, 4);
    }

    #[test]
    fn test_add_rejects_invalid_template() {
        let mut library = TemplateLibrary::new();
        let mut bad = custom("");
        bad.content = "short".to_string();
        let report = library.add(bad, &ValidationLimits::default()).expect_err("invalid");
        assert_eq!(report.len(), 2);
        assert!(library.is_empty());
    }

    #[test]
    fn test_category_parse_and_labels() {
        assert_eq!("Work".parse::<EmailCategory>(), Ok(EmailCategory::Work));
        assert_eq!(" notification ".parse::<EmailCategory>(), Ok(EmailCategory::Notification));
        assert!("spam".parse::<EmailCategory>().is_err());
        assert_eq!(EmailCategory::Formal.label(), "Formal email");
    }

    #[test]
    fn test_template_json_uses_lowercase_category() {
        let json = serde_json::to_string(&custom("x")).expect("serialize");
        assert!(json.contains("\"category\":\"formal\""));
    }
}
