//! System font discovery and CSS family chains.
//!
//! Certificate fields name their font the way a stylesheet would
//! (`"Times New Roman", serif`). [`family_chain`] splits such a list, and
//! [`FontRegistry`] records which families the OS has installed and which
//! of them it uses for the generic keywords, so that `serif` draws with
//! the same face the rest of the desktop does.
//!
//! ```text
//! FontRegistry
//!   ├── families: installed family names (font-kit)
//!   └── generics: serif / sans-serif / monospace → OS default family
//! ```

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use font_kit::family_name::FamilyName;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;

/// The CSS generic keywords a chain may end with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
}

impl GenericFamily {
    /// Parse a lowercase generic keyword.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "serif" => Some(Self::Serif),
            "sans-serif" => Some(Self::SansSerif),
            "monospace" => Some(Self::Monospace),
            "cursive" => Some(Self::Cursive),
            "fantasy" => Some(Self::Fantasy),
            _ => None,
        }
    }
}

/// Split a CSS family list into its unquoted, non-empty entries.
pub fn family_chain(css: &str) -> impl Iterator<Item = &str> {
    css.split(',')
        .map(|entry| entry.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|entry| !entry.is_empty())
}

/// Installed families and the OS defaults behind the generic keywords,
/// enumerated once per process.
pub struct FontRegistry {
    families: BTreeSet<String>,
    generics: HashMap<GenericFamily, String>,
}

impl FontRegistry {
    /// Enumerate the system's font families and generic defaults.
    pub fn discover() -> Self {
        let started = Instant::now();
        let source = SystemSource::new();
        let mut registry = Self::empty();

        for family in source.all_families().unwrap_or_default() {
            registry.insert_family(&family);
        }

        for (generic, name) in [
            (GenericFamily::Serif, FamilyName::Serif),
            (GenericFamily::SansSerif, FamilyName::SansSerif),
            (GenericFamily::Monospace, FamilyName::Monospace),
        ] {
            if let Some(family) = system_default(&source, name) {
                registry.set_generic(generic, &family);
            }
        }

        log::info!(
            "fonts: {} families, serif = {:?}, sans-serif = {:?} ({:.1}ms)",
            registry.family_count(),
            registry.generic_family(GenericFamily::Serif),
            registry.generic_family(GenericFamily::SansSerif),
            started.elapsed().as_secs_f64() * 1000.0,
        );
        registry
    }

    /// A registry with nothing installed and no generic defaults.
    pub fn empty() -> Self {
        Self {
            families: BTreeSet::new(),
            generics: HashMap::new(),
        }
    }

    /// Record an installed family. Blank names are ignored.
    pub fn insert_family(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.families.insert(name.to_string());
        }
    }

    /// Make `generic` stand for `family`.
    pub fn set_generic(&mut self, generic: GenericFamily, family: &str) {
        self.insert_family(family);
        self.generics.insert(generic, family.trim().to_string());
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// The family the OS draws `generic` with, if known.
    pub fn generic_family(&self, generic: GenericFamily) -> Option<&str> {
        self.generics.get(&generic).map(String::as_str)
    }
}

fn system_default(source: &SystemSource, name: FamilyName) -> Option<String> {
    let handle = source.select_best_match(&[name], &Properties::new()).ok()?;
    let family = handle.load().ok()?.family_name();
    (!family.is_empty()).then_some(family)
}

// ===================================================================
// Tests
// ===================================================================
