//! Shared compiler option enums.
//!
//! These live in tsz-common so that the program front-end, the configuration
//! loader and the command line can agree on them without depending on each
//! other.

use serde::{Deserialize, Serialize};

/// Module code generation target (`--module`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    None,
    CommonJS,
    AMD,
    UMD,
    System,
    ES2015,
}

impl ModuleKind {
    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::None => "none",
            ModuleKind::CommonJS => "commonjs",
            ModuleKind::AMD => "amd",
            ModuleKind::UMD => "umd",
            ModuleKind::System => "system",
            ModuleKind::ES2015 => "es2015",
        }
    }
}

/// Language version of the emitted output (`--target`).
///
/// Variants are ordered so that `target < ScriptTarget::ES2015` reads the
/// way the option validator needs it to.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ScriptTarget {
    #[default]
    ES3,
    ES5,
    ES2015,
    Latest,
}

/// JSX handling mode (`--jsx`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsxEmit {
    Preserve,
    React,
}
