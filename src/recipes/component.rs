//! Recipe components

use std::{fmt, str::FromStr};

use crate::recipes::RecipeError;

/// Separator between the source name and the display alias in a component key.
pub const ALIAS_SEPARATOR: char = '|';

/// Prefix marking a component as disabled in a recipe file.
pub const DISABLED_PREFIX: char = '-';

/// The two names packed into a component key.
///
/// `source` is what the resolver recurses into and prices, `display` is the
/// label the resolved quantity is aggregated under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    /// Name of the ingredient or sub-recipe to resolve
    pub source: String,

    /// Name the quantity is reported under
    pub display: String,
}

impl ComponentKey {
    /// A key whose display name is its source name.
    pub fn plain(name: impl Into<String>) -> Self {
        let source = name.into();

        Self {
            display: source.clone(),
            source,
        }
    }

    /// A key reporting `source` under `display`.
    pub fn aliased(source: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display: display.into(),
        }
    }

    /// Returns true if the display name differs from the source name.
    pub fn is_aliased(&self) -> bool {
        self.source != self.display
    }
}

impl FromStr for ComponentKey {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(ALIAS_SEPARATOR).map(str::trim);

        let (Some(source), display, None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RecipeError::InvalidComponentKey(s.to_string()));
        };

        if source.is_empty() || display.is_some_and(str::is_empty) {
            return Err(RecipeError::InvalidComponentKey(s.to_string()));
        }

        Ok(match display {
            Some(display) => Self::aliased(source, display),
            None => Self::plain(source),
        })
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_aliased() {
            write!(f, "{}{ALIAS_SEPARATOR}{}", self.source, self.display)
        } else {
            f.write_str(&self.source)
        }
    }
}

/// One weighted entry of a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Source and display names
    pub key: ComponentKey,

    /// Relative weight within the recipe
    pub weight: f64,
}

impl Component {
    /// Creates a new component.
    pub fn new(key: ComponentKey, weight: f64) -> Self {
        Self { key, weight }
    }

    /// Name of the ingredient or sub-recipe to resolve.
    pub fn source(&self) -> &str {
        &self.key.source
    }

    /// Name the quantity is reported under.
    pub fn display(&self) -> &str {
        &self.key.display
    }
}
