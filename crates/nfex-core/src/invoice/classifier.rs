//! Keyword classification of item descriptions.

use crate::models::invoice::Category;

/// Terms that mark an item as a durable good.
pub const DEFAULT_ASSET_KEYWORDS: &[&str] = &["periférico", "móvel", "equipamento", "hardware"];

/// Maps descriptions to [`Category`] by case-insensitive substring match.
#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
}

impl Classifier {
    /// Create a classifier from a keyword set. Blank keywords are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Asset if any keyword occurs in the description, otherwise consumable.
    pub fn classify(&self, description: &str) -> Category {
        let description = description.to_lowercase();
        if self.keywords.iter().any(|k| description.contains(k.as_str())) {
            Category::Asset
        } else {
            Category::Consumable
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_KEYWORDS)
    }
}

/// Classify with the default keyword set.
pub fn classify(description: &str) -> Category {
    Classifier::default().classify(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_defaults() {
        assert_eq!(classify("Mouse Periférico"), Category::Asset);
        assert_eq!(classify("Notebook hardware"), Category::Asset);
        assert_eq!(classify("EQUIPAMENTO DE REDE"), Category::Asset);
        assert_eq!(classify("Cadeira Móvel"), Category::Asset);
        assert_eq!(classify("Papel A4"), Category::Consumable);
        assert_eq!(classify("Consultoria"), Category::Consumable);
        assert_eq!(classify(""), Category::Consumable);
    }

    #[test]
    fn test_custom_keywords() {
        let classifier = Classifier::new(["  Monitor ", "", "CADEIRA"]);
        assert_eq!(classifier.keywords(), ["monitor", "cadeira"]);
        assert_eq!(classifier.classify("monitor 24\""), Category::Asset);
        assert_eq!(classifier.classify("Cadeira giratória"), Category::Asset);
        assert_eq!(classifier.classify("Notebook hardware"), Category::Consumable);
    }

    #[test]
    fn test_no_keywords_is_always_consumable() {
        let classifier = Classifier::new(Vec::<String>::new());
        assert_eq!(classifier.classify("hardware"), Category::Consumable);
    }
}
