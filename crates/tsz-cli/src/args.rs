use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use tsz_common::{JsxEmit, ModuleKind, ScriptTarget};
use tsz_program::ModuleResolutionKind;

/// CLI arguments for the tsz binary.
#[derive(Parser, Debug)]
#[command(
    name = "tsz",
    version,
    about = "Resolve modules and build the program for a set of TypeScript files"
)]
pub struct CliArgs {
    // ==================== Command-line Only Options ====================
    /// Path to tsconfig.json or a directory containing it.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    // ==================== Language and Environment ====================
    /// Set the JavaScript language version for emitted JavaScript.
    #[arg(short = 't', long, value_enum, ignore_case = true)]
    pub target: Option<Target>,

    /// Specify what module code is generated.
    #[arg(short = 'm', long, value_enum, ignore_case = true)]
    pub module: Option<Module>,

    /// Specify what JSX code is generated.
    #[arg(long, value_enum)]
    pub jsx: Option<Jsx>,

    /// Disable including any library files, including the default lib.d.ts.
    #[arg(long = "noLib", alias = "no-lib")]
    pub no_lib: bool,

    // ==================== Modules ====================
    /// Specify how TypeScript looks up a file from a given module specifier.
    #[arg(
        long = "moduleResolution",
        alias = "module-resolution",
        value_enum,
        ignore_case = true
    )]
    pub module_resolution: Option<ModuleResolution>,

    /// Specify the base directory to resolve non-relative module names.
    #[arg(long = "baseUrl", alias = "base-url")]
    pub base_url: Option<String>,

    /// Allow multiple folders to be treated as one when resolving modules.
    #[arg(long = "rootDirs", alias = "root-dirs", value_delimiter = ',')]
    pub root_dirs: Option<Vec<String>>,

    /// Disallow 'import's, 'require's or '<reference>'s from expanding the number of files.
    #[arg(long = "noResolve", alias = "no-resolve")]
    pub no_resolve: bool,

    // ==================== Emit ====================
    /// Specify the root folder within your source files.
    #[arg(long = "rootDir", alias = "root-dir")]
    pub root_dir: Option<String>,

    /// Specify an output folder for all emitted files.
    #[arg(long = "outDir", alias = "out-dir")]
    pub out_dir: Option<String>,

    /// Specify a file that bundles all outputs into one JavaScript file.
    #[arg(long = "outFile", alias = "out-file")]
    pub out_file: Option<String>,

    // ==================== Interop Constraints ====================
    /// Ensure that casing is correct in imports.
    #[arg(
        long = "forceConsistentCasingInFileNames",
        alias = "force-consistent-casing-in-file-names"
    )]
    pub force_consistent_casing_in_file_names: bool,

    /// Ensure that each file can be safely transpiled without relying on other imports.
    #[arg(long = "isolatedModules", alias = "isolated-modules")]
    pub isolated_modules: bool,

    // ==================== Output Formatting ====================
    /// Enable color and formatting in the output to make compiler errors easier to read.
    #[arg(long)]
    pub pretty: Option<bool>,

    /// Print all of the files read during the compilation.
    #[arg(long = "listFiles", alias = "list-files")]
    pub list_files: bool,

    // ==================== Input Files ====================
    /// Input files to compile.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Target {
    Es3,
    Es5,
    #[value(alias = "es6")]
    Es2015,
    #[value(name = "latest", alias = "esnext")]
    Latest,
}

impl Target {
    pub fn to_script_target(self) -> ScriptTarget {
        match self {
            Target::Es3 => ScriptTarget::ES3,
            Target::Es5 => ScriptTarget::ES5,
            Target::Es2015 => ScriptTarget::ES2015,
            Target::Latest => ScriptTarget::Latest,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Module {
    None,
    #[value(name = "commonjs", alias = "common-js")]
    CommonJs,
    Amd,
    Umd,
    System,
    #[value(alias = "es6")]
    Es2015,
}

impl Module {
    pub fn to_module_kind(self) -> ModuleKind {
        match self {
            Module::None => ModuleKind::None,
            Module::CommonJs => ModuleKind::CommonJS,
            Module::Amd => ModuleKind::AMD,
            Module::Umd => ModuleKind::UMD,
            Module::System => ModuleKind::System,
            Module::Es2015 => ModuleKind::ES2015,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Jsx {
    /// Keep the JSX as part of the output to be further transformed by another transform step.
    Preserve,
    /// Emit .js files with JSX changed to the equivalent React.createElement calls.
    React,
}

impl Jsx {
    pub fn to_jsx_emit(self) -> JsxEmit {
        match self {
            Jsx::Preserve => JsxEmit::Preserve,
            Jsx::React => JsxEmit::React,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModuleResolution {
    /// Walk up from the importing file looking for `<name>.ts` and `<name>.d.ts`.
    Classic,
    /// Node.js style resolution through `node_modules` folders.
    #[value(alias = "nodejs")]
    Node,
    /// Resolve through `baseUrl`, `paths` and `rootDirs`.
    #[value(name = "baseurl", alias = "base-url")]
    BaseUrl,
}

impl ModuleResolution {
    pub fn to_module_resolution_kind(self) -> ModuleResolutionKind {
        match self {
            ModuleResolution::Classic => ModuleResolutionKind::Classic,
            ModuleResolution::Node => ModuleResolutionKind::NodeJs,
            ModuleResolution::BaseUrl => ModuleResolutionKind::BaseUrl,
        }
    }
}
