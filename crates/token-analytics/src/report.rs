//! Analysis Document
//!
//! The narrative generator emits a typed tree of sections rather than
//! preformatted strings; renderers decide how severity and bullets look.

use serde::{Deserialize, Serialize};

/// How urgently an item should be surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Alert,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Para,
    Bullet,
}

/// One paragraph or bullet within a section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Item {
    pub fn para(text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Para,
            text: text.into(),
            severity: None,
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Bullet,
            text: text.into(),
            severity: Some(Severity::Info),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// A titled, ordered run of items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }
}

/// The complete structured analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sections: Vec<Section>,
}

impl Analysis {
    /// Append a section, dropping it when empty.
    pub fn push_section(&mut self, section: Section) {
        if !section.items.is_empty() {
            self.sections.push(section);
        }
    }

    /// Find a section by title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}
