use std::collections::BTreeMap;

pub const DEFAULT_THEME: &str = "Emoji";

const BUILTIN_THEMES: [(&str, &[&str]); 4] = [
    (
        "Emoji",
        &[
            "🍎", "🚗", "🐶", "🌟", "🎵", "🏀", "🎲", "🍕", "📚", "✈️", "🎮", "👾", "💡", "🌈", "🎁",
            "⚽",
        ],
    ),
    ("Food", &["🍕", "🍔", "🍟", "🌮", "🍩", "🍓", "🍇", "🍉"]),
    ("Animal", &["🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼"]),
    ("Classic", &["A", "B", "C", "D", "E", "F", "G", "H"]),
];

/// A named palette of distinct symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    name: String,
    symbols: Vec<String>,
}

impl Theme {
    /// Builds a theme, dropping repeated symbols while keeping first-seen order.
    /// Returns `None` when no symbol is left.
    pub fn new<I, S>(name: impl Into<String>, symbols: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.into();
            if symbol.trim().is_empty() || unique.contains(&symbol) {
                continue;
            }
            unique.push(symbol);
        }
        if unique.is_empty() {
            return None;
        }
        Some(Theme {
            name: name.into(),
            symbols: unique,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Every theme a game can be dealt from, in menu order.
#[derive(Clone, Debug)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let themes = BUILTIN_THEMES
            .iter()
            .filter_map(|(name, symbols)| Theme::new(*name, symbols.iter().copied()))
            .collect();
        ThemeRegistry { themes }
    }
}

impl ThemeRegistry {
    /// Built-in themes plus the custom ones from the configuration file.
    /// A custom theme replaces a built-in of the same name.
    pub fn with_custom(custom: &BTreeMap<String, Vec<String>>) -> Self {
        let mut registry = Self::default();
        for (name, symbols) in custom {
            let Some(theme) = Theme::new(name.clone(), symbols.iter().cloned()) else {
                tracing::warn!(theme = %name, "custom theme has no symbols, skipping");
                continue;
            };
            let existing = registry
                .themes
                .iter_mut()
                .find(|t| t.name.eq_ignore_ascii_case(&theme.name));
            if let Some(slot) = existing {
                *slot = theme;
            } else {
                registry.themes.push(theme);
            }
        }
        registry
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes
            .iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Looks a theme up by name, falling back to the default palette.
    pub fn resolve(&self, name: &str) -> &Theme {
        if let Some(theme) = self.get(name) {
            return theme;
        }
        tracing::warn!(theme = %name, fallback = DEFAULT_THEME, "unknown theme");
        self.get(DEFAULT_THEME)
            .or_else(|| self.themes.first())
            .expect("registry always holds the built-in themes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_themes_are_registered() {
        let registry = ThemeRegistry::default();
        let names: Vec<&str> = registry.themes().iter().map(Theme::name).collect();
        assert_eq!(names, vec!["Emoji", "Food", "Animal", "Classic"]);
        assert_eq!(registry.resolve("Emoji").symbols().len(), 16);
        assert_eq!(registry.resolve("classic").symbols()[0], "A");
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let registry = ThemeRegistry::default();
        assert_eq!(registry.resolve("Planets").name(), DEFAULT_THEME);
    }

    #[test]
    fn duplicate_symbols_are_dropped() {
        let theme = Theme::new("Dup", ["A", "B", "A", " ", "C"]).unwrap();
        assert_eq!(theme.symbols(), ["A", "B", "C"]);
        assert!(Theme::new("Empty", Vec::<String>::new()).is_none());
    }

    #[test]
    fn custom_themes_extend_and_override() {
        let mut custom = BTreeMap::new();
        custom.insert("Classic".to_string(), vec!["X".to_string(), "Y".to_string()]);
        custom.insert("Shapes".to_string(), vec!["■".to_string(), "●".to_string()]);
        custom.insert("Blank".to_string(), Vec::new());

        let registry = ThemeRegistry::with_custom(&custom);
        assert_eq!(registry.resolve("Classic").symbols(), ["X", "Y"]);
        assert_eq!(registry.resolve("Shapes").symbols().len(), 2);
        assert!(registry.get("Blank").is_none());
        assert_eq!(registry.themes().len(), 5);
    }

    #[test]
    fn override_matches_builtin_name_in_any_case() {
        let mut custom = BTreeMap::new();
        custom.insert("classic".to_string(), vec!["X".to_string(), "Y".to_string()]);

        let registry = ThemeRegistry::with_custom(&custom);
        let names: Vec<&str> = registry.themes().iter().map(Theme::name).collect();
        assert_eq!(names, vec!["Emoji", "Food", "Animal", "classic"]);
        assert_eq!(registry.resolve("classic").symbols(), ["X", "Y"]);
        assert_eq!(registry.resolve("Classic").symbols(), ["X", "Y"]);
    }
}
