use tracing::warn;

use crate::language::{CommentLanguage, IlLanguage, Language};

/// The set of languages a host offers, in registration order.
pub struct Languages {
    languages: Vec<Box<dyn Language>>,
}

/// Lowercase alphanumerics only, so `il-structured` finds `IL (structured)`.
fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Languages {
    pub fn new() -> Self {
        Self {
            languages: Vec::new(),
        }
    }

    /// Flat IL, structured IL and the comment-only fallback.
    pub fn with_defaults() -> Self {
        let mut languages = Self::new();
        languages.register(Box::new(IlLanguage::flat()));
        languages.register(Box::new(IlLanguage::structured()));
        languages.register(Box::new(CommentLanguage));
        languages
    }

    /// Add a language. A language whose name collides with an existing one
    /// is still added but can only be reached through [`all`](Self::all).
    pub fn register(&mut self, language: Box<dyn Language>) {
        if self.get(language.name()).is_some() {
            warn!(language = language.name(), "language name already registered");
        }
        self.languages.push(language);
    }

    /// Case- and punctuation-insensitive lookup by display name.
    pub fn get(&self, name: &str) -> Option<&dyn Language> {
        let key = lookup_key(name);
        self.languages
            .iter()
            .find(|l| lookup_key(l.name()) == key)
            .map(|l| l.as_ref())
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Language> {
        self.languages.iter().map(|l| l.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for Languages {
    fn default() -> Self {
        Self::with_defaults()
    }
}
