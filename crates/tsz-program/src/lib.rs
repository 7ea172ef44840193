//! Program front-end for tsz.
//!
//! This crate turns root file names and compiler options into a `Program`:
//! - `scanner` pre-processes source text into the syntax the front-end needs
//!   (reference directives, imports, exports, ambient module declarations)
//! - `module_resolver` maps module names to files (NodeJs, Classic, BaseUrl)
//! - `program` discovers the file graph, reuses the structure of an earlier
//!   program when nothing relevant changed, and validates the options
//! - `config` loads `tsconfig.json` into `CompilerOptions`

pub mod config;
pub mod host;
pub mod module_resolver;
pub mod options;
pub mod program;
pub mod scanner;
pub mod source_file;

pub use config::{ParsedConfig, find_config_file, load_config};
pub use host::{
    CompilerHost, MemoryHost, SystemHost, default_lib_file_name, executable_directory,
};
pub use module_resolver::{
    ModuleResolutionHost, ResolvedModule, ResolvedModuleWithFailedLookupLocations,
    resolve_module_name,
};
pub use options::{CompilerOptions, ModuleResolutionKind, StructureOptions};
pub use program::{
    CancellationToken, CheckerFactory, OperationCanceled, Program, ProgramTimings,
    ResolvedModules, TypeChecker, resolve_tripleslash_reference,
};
pub use source_file::{SourceFile, SourceVersion};
