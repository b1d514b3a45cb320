//! Homepage feature cards.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::store::DocumentStore;

/// A homepage tile linking to a documentation section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureCard {
    pub title: String,

    /// Asset key of the card illustration, relative to the static directory
    pub icon: String,

    /// Inline Markdown
    pub description: String,

    /// Site-internal route, e.g. `/docs/problems/intro`
    pub link: String,
}

/// Ordered feature cards laid out in a fixed number of columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureGrid {
    #[serde(default = "default_columns")]
    pub columns: usize,

    #[serde(default)]
    pub features: Vec<FeatureCard>,
}

fn default_columns() -> usize {
    3
}

impl Default for FeatureGrid {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            features: Vec::new(),
        }
    }
}

impl FeatureGrid {
    pub fn new(columns: usize, features: Vec<FeatureCard>) -> Self {
        Self { columns, features }
    }

    /// Check the column count and that every card link resolves.
    pub fn validate(&self, store: &dyn DocumentStore) -> Result<(), ValidationError> {
        if self.columns == 0 {
            return Err(ValidationError::InvalidColumns(self.columns));
        }

        for card in &self.features {
            if !store.route_exists(&card.link) {
                return Err(ValidationError::DanglingReference {
                    scope: format!("Feature card '{}'", card.title),
                    target: card.link.clone(),
                });
            }
        }

        Ok(())
    }

    /// Cards grouped into rows, left to right and top to bottom.
    ///
    /// The last row may be shorter than `columns`.
    pub fn rows(&self) -> impl Iterator<Item = &[FeatureCard]> {
        self.features.chunks(self.columns.max(1))
    }
}
