//! Diagnostic message templates used by the program front-end.
//!
//! Texts and codes match `diagnosticMessages.json` from the TypeScript
//! compiler so that output can be compared against tsc baselines.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const A_FILE_CANNOT_HAVE_A_REFERENCE_TO_ITSELF: u32 = 1006;
    pub const ASTERISK_SLASH_EXPECTED: u32 = 1010;
    pub const INVALID_REFERENCE_DIRECTIVE_SYNTAX: u32 = 1084;
    pub const CANNOT_COMPILE_MODULES_UNLESS_THE_MODULE_FLAG_IS_PROVIDED: u32 = 1148;
    pub const FILE_NAME_DIFFERS_FROM_ALREADY_INCLUDED_FILE_NAME_ONLY_IN_CASING: u32 = 1149;
    pub const UNTERMINATED_TEMPLATE_LITERAL: u32 = 1160;
    pub const CANNOT_COMPILE_MODULES_INTO_ES2015_WHEN_TARGETING_ES5_OR_LOWER: u32 = 1204;
    pub const CANNOT_COMPILE_NAMESPACES_WHEN_THE_ISOLATED_MODULES_FLAG_IS_PROVIDED: u32 = 1208;
    pub const EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_IS_NOT_A_MODULE: u32 = 2654;
    pub const EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_CANNOT_CONTAIN_TRIPLESLASH_REFERENCES: u32 =
        2656;
    pub const CANNOT_FIND_THE_COMMON_SUBDIRECTORY_PATH_FOR_THE_INPUT_FILES: u32 = 5009;
    pub const CANNOT_READ_FILE: u32 = 5012;
    pub const UNSUPPORTED_FILE_ENCODING: u32 = 5013;
    pub const FAILED_TO_PARSE_FILE: u32 = 5014;
    pub const OPTION_ISOLATED_MODULES_CAN_ONLY_BE_USED_WITH_MODULE_OR_ES2015_TARGET: u32 = 5047;
    pub const OPTION_INLINE_SOURCES_REQUIRES_INLINE_SOURCE_MAP_OR_SOURCE_MAP: u32 = 5051;
    pub const OPTION_CANNOT_BE_SPECIFIED_WITHOUT_SPECIFYING_OPTION: u32 = 5052;
    pub const OPTION_CANNOT_BE_SPECIFIED_WITH_OPTION: u32 = 5053;
    pub const MODULE_RESOLUTION_KIND_BASE_URL_CANNOT_BE_USED_WITHOUT_BASE_URL: u32 = 5060;
    pub const MODULE_RESOLUTION_KIND_CANNOT_BE_DETERMINED_AUTOMATICALLY: u32 = 5061;
    pub const OPTION_CAN_ONLY_BE_USED_WHEN_MODULE_RESOLUTION_IS_BASE_URL: u32 = 5062;
    pub const PATTERN_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER: u32 = 5063;
    pub const SUBSTITUTION_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER: u32 = 5064;
    pub const FILE_NOT_FOUND: u32 = 6053;
    pub const FILE_HAS_UNSUPPORTED_EXTENSION: u32 = 6054;
    pub const FILE_IS_NOT_UNDER_ROOT_DIR: u32 = 6059;
    pub const ONLY_AMD_AND_SYSTEM_MODULES_ARE_SUPPORTED_ALONGSIDE: u32 = 6082;
    pub const NO_INPUTS_WERE_FOUND_IN_CONFIG_FILE: u32 = 18003;
}

pub mod diagnostic_messages {
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const A_FILE_CANNOT_HAVE_A_REFERENCE_TO_ITSELF: &str =
        "A file cannot have a reference to itself.";
    pub const ASTERISK_SLASH_EXPECTED: &str = "'*/' expected.";
    pub const INVALID_REFERENCE_DIRECTIVE_SYNTAX: &str = "Invalid 'reference' directive syntax.";
    pub const CANNOT_COMPILE_MODULES_UNLESS_THE_MODULE_FLAG_IS_PROVIDED: &str =
        "Cannot compile modules unless the '--module' flag is provided.";
    pub const FILE_NAME_DIFFERS_FROM_ALREADY_INCLUDED_FILE_NAME_ONLY_IN_CASING: &str =
        "File name '{0}' differs from already included file name '{1}' only in casing";
    pub const UNTERMINATED_TEMPLATE_LITERAL: &str = "Unterminated template literal.";
    pub const CANNOT_COMPILE_MODULES_INTO_ES2015_WHEN_TARGETING_ES5_OR_LOWER: &str =
        "Cannot compile modules into 'es2015' when targeting 'ES5' or lower.";
    pub const CANNOT_COMPILE_NAMESPACES_WHEN_THE_ISOLATED_MODULES_FLAG_IS_PROVIDED: &str =
        "Cannot compile namespaces when the '--isolatedModules' flag is provided.";
    pub const EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_IS_NOT_A_MODULE: &str = "Exported external package typings file '{0}' is not a module. Please contact the package author to update the package definition.";
    pub const EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_CANNOT_CONTAIN_TRIPLESLASH_REFERENCES: &str = "Exported external package typings file cannot contain tripleslash references. Please contact the package author to update the package definition.";
    pub const CANNOT_FIND_THE_COMMON_SUBDIRECTORY_PATH_FOR_THE_INPUT_FILES: &str =
        "Cannot find the common subdirectory path for the input files.";
    pub const CANNOT_READ_FILE: &str = "Cannot read file '{0}': {1}";
    pub const UNSUPPORTED_FILE_ENCODING: &str = "Unsupported file encoding.";
    pub const FAILED_TO_PARSE_FILE: &str = "Failed to parse file '{0}': {1}.";
    pub const OPTION_ISOLATED_MODULES_CAN_ONLY_BE_USED_WITH_MODULE_OR_ES2015_TARGET: &str = "Option 'isolatedModules' can only be used when either option '--module' is provided or option 'target' is 'ES2015' or higher.";
    pub const OPTION_INLINE_SOURCES_REQUIRES_INLINE_SOURCE_MAP_OR_SOURCE_MAP: &str = "Option 'inlineSources' can only be used when either option '--inlineSourceMap' or option '--sourceMap' is provided.";
    pub const OPTION_CANNOT_BE_SPECIFIED_WITHOUT_SPECIFYING_OPTION: &str =
        "Option '{0}' cannot be specified without specifying option '{1}'.";
    pub const OPTION_CANNOT_BE_SPECIFIED_WITH_OPTION: &str =
        "Option '{0}' cannot be specified with option '{1}'.";
    pub const MODULE_RESOLUTION_KIND_BASE_URL_CANNOT_BE_USED_WITHOUT_BASE_URL: &str =
        "'moduleResolution' kind 'BaseUrl' cannot be used without specifying '--baseUrl' option.";
    pub const MODULE_RESOLUTION_KIND_CANNOT_BE_DETERMINED_AUTOMATICALLY: &str = "Module resolution kind cannot be determined automatically. Please specify module resolution explicitly via 'moduleResolution' option.";
    pub const OPTION_CAN_ONLY_BE_USED_WHEN_MODULE_RESOLUTION_IS_BASE_URL: &str =
        "Option '{0}' can only be used when option 'moduleResolution' is 'BaseUrl'.";
    pub const PATTERN_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER: &str =
        "Pattern '{0}' can have at most one '*' character";
    pub const SUBSTITUTION_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER: &str =
        "Substitution '{0}' in pattern '{1}' in can have at most one '*' character";
    pub const FILE_NOT_FOUND: &str = "File '{0}' not found.";
    pub const FILE_HAS_UNSUPPORTED_EXTENSION: &str =
        "File '{0}' has unsupported extension. The only supported extensions are {1}.";
    pub const FILE_IS_NOT_UNDER_ROOT_DIR: &str = "File '{0}' is not under 'rootDir' '{1}'. 'rootDir' is expected to contain all source files.";
    pub const ONLY_AMD_AND_SYSTEM_MODULES_ARE_SUPPORTED_ALONGSIDE: &str =
        "Only 'amd' and 'system' modules are supported alongside --{0}.";
    pub const NO_INPUTS_WERE_FOUND_IN_CONFIG_FILE: &str =
        "No inputs were found in config file '{0}'.";
}

macro_rules! diagnostic_table {
    ($($name:ident),* $(,)?) => {
        /// Message definitions (code, category and template) by name.
        pub mod messages {
            use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes, diagnostic_messages};

            $(
                pub const $name: DiagnosticMessage = DiagnosticMessage {
                    code: diagnostic_codes::$name,
                    category: DiagnosticCategory::Error,
                    message: diagnostic_messages::$name,
                };
            )*
        }

        pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[$(messages::$name),*];
    };
}

diagnostic_table!(
    UNTERMINATED_STRING_LITERAL,
    A_FILE_CANNOT_HAVE_A_REFERENCE_TO_ITSELF,
    ASTERISK_SLASH_EXPECTED,
    INVALID_REFERENCE_DIRECTIVE_SYNTAX,
    CANNOT_COMPILE_MODULES_UNLESS_THE_MODULE_FLAG_IS_PROVIDED,
    FILE_NAME_DIFFERS_FROM_ALREADY_INCLUDED_FILE_NAME_ONLY_IN_CASING,
    UNTERMINATED_TEMPLATE_LITERAL,
    CANNOT_COMPILE_MODULES_INTO_ES2015_WHEN_TARGETING_ES5_OR_LOWER,
    CANNOT_COMPILE_NAMESPACES_WHEN_THE_ISOLATED_MODULES_FLAG_IS_PROVIDED,
    EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_IS_NOT_A_MODULE,
    EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_CANNOT_CONTAIN_TRIPLESLASH_REFERENCES,
    CANNOT_FIND_THE_COMMON_SUBDIRECTORY_PATH_FOR_THE_INPUT_FILES,
    CANNOT_READ_FILE,
    UNSUPPORTED_FILE_ENCODING,
    FAILED_TO_PARSE_FILE,
    OPTION_ISOLATED_MODULES_CAN_ONLY_BE_USED_WITH_MODULE_OR_ES2015_TARGET,
    OPTION_INLINE_SOURCES_REQUIRES_INLINE_SOURCE_MAP_OR_SOURCE_MAP,
    OPTION_CANNOT_BE_SPECIFIED_WITHOUT_SPECIFYING_OPTION,
    OPTION_CANNOT_BE_SPECIFIED_WITH_OPTION,
    MODULE_RESOLUTION_KIND_BASE_URL_CANNOT_BE_USED_WITHOUT_BASE_URL,
    MODULE_RESOLUTION_KIND_CANNOT_BE_DETERMINED_AUTOMATICALLY,
    OPTION_CAN_ONLY_BE_USED_WHEN_MODULE_RESOLUTION_IS_BASE_URL,
    PATTERN_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER,
    SUBSTITUTION_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER,
    FILE_NOT_FOUND,
    FILE_HAS_UNSUPPORTED_EXTENSION,
    FILE_IS_NOT_UNDER_ROOT_DIR,
    ONLY_AMD_AND_SYSTEM_MODULES_ARE_SUPPORTED_ALONGSIDE,
    NO_INPUTS_WERE_FOUND_IN_CONFIG_FILE,
);
