//! Puzzle data: definitions, the bundled set, and catalogs loaded from JSON.

/// Generate the `ALL`, `from_index()`, and `name()` methods for the
/// four-variant difficulty enum (Novice / Apprentice / Journeyman / Master).
macro_rules! difficulty_enum_impl {
    ($name:ident) => {
        impl $name {
            pub const ALL: [$name; 4] = [
                $name::Novice,
                $name::Apprentice,
                $name::Journeyman,
                $name::Master,
            ];

            pub fn from_index(index: usize) -> Self {
                Self::ALL.get(index).copied().unwrap_or($name::Novice)
            }

            pub fn name(&self) -> &'static str {
                match self {
                    Self::Novice => "Novice",
                    Self::Apprentice => "Apprentice",
                    Self::Journeyman => "Journeyman",
                    Self::Master => "Master",
                }
            }
        }
    };
}

pub mod builtin;
pub mod catalog;
pub mod types;

pub use builtin::builtin_puzzles;
pub use catalog::{CatalogError, PuzzleCatalog, PuzzleFilter};
pub use types::*;
