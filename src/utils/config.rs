//! Configuration and constants for the analyzer.

/// Name used in default report titles
pub const REPORT_TOOL_NAME: &str = "bundle-treemap";

/// Current chart data schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Compression level used for gzip sizes.
/// Fixed so repeated runs produce identical numbers.
pub const GZIP_LEVEL: u32 = 9;

/// Emitted file extensions treated as script bundles
pub const ASSET_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Asset `type` value for real emitted assets (webpack 5 tags auxiliary entries differently)
pub const ASSET_TYPE: &str = "asset";

/// Module type of webpack runtime modules. They carry no id and are never reported.
pub const RUNTIME_MODULE_TYPE: &str = "runtime";

// Labels for nodes the tree builder creates itself
pub const CONCATENATED_SUFFIX: &str = " (concatenated)";
pub const ENTRY_MODULES_LABEL: &str = "./entry modules";
pub const MULTI_MODULE_PREFIX: &str = "multi ";
pub const UNRESOLVED_LABEL_PREFIX: &str = "unresolved modules: ";

/// Path of every chunk root; module paths hang off it ("./src/a.js")
pub const ROOT_PATH: &str = ".";

// Default report locations
pub const DEFAULT_JSON_REPORT: &str = "report.json";
pub const DEFAULT_HTML_REPORT: &str = "report.html";

// Record collections a compilation object may carry (at least one is required)
pub const COMPILATION_FIELD_NAMES: &[&str] = &["assets", "chunks", "modules"];
