// 🏷️ Category - The three learning tracks every XP and progress row belongs to
//
// Piscine Go and Piscine JS are bootcamp tracks, Module is regular coursework.
// Wire keys (piscineGo / piscineJs / module) are what the view models serialize to.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    PiscineGo,
    PiscineJs,
    Module,
}

impl Category {
    /// Fixed iteration order used by the XP chart tabs
    pub const ALL: [Category; 3] = [Category::PiscineGo, Category::PiscineJs, Category::Module];

    /// Key used on the wire and in markup (`data-category`)
    pub fn key(&self) -> &'static str {
        match self {
            Category::PiscineGo => "piscineGo",
            Category::PiscineJs => "piscineJs",
            Category::Module => "module",
        }
    }

    /// Human-readable tab label
    pub fn label(&self) -> &'static str {
        match self {
            Category::PiscineGo => "Piscine Go",
            Category::PiscineJs => "Piscine JS",
            Category::Module => "Module",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        match key {
            "piscineGo" => Some(Category::PiscineGo),
            "piscineJs" => Some(Category::PiscineJs),
            "module" => Some(Category::Module),
            _ => None,
        }
    }
}

// ============================================================================
// CATEGORY MAP
// ============================================================================

/// One value per category. Serializes as `{piscineGo, piscineJs, module}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMap<T> {
    pub piscine_go: T,
    pub piscine_js: T,
    pub module: T,
}

impl<T> CategoryMap<T> {
    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::PiscineGo => &self.piscine_go,
            Category::PiscineJs => &self.piscine_js,
            Category::Module => &self.module,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::PiscineGo => &mut self.piscine_go,
            Category::PiscineJs => &mut self.piscine_js,
            Category::Module => &mut self.module,
        }
    }

    /// Iterate in `Category::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn map<U, F: FnMut(Category, T) -> U>(self, mut f: F) -> CategoryMap<U> {
        CategoryMap {
            piscine_go: f(Category::PiscineGo, self.piscine_go),
            piscine_js: f(Category::PiscineJs, self.piscine_js),
            module: f(Category::Module, self.module),
        }
    }
}
