// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths, binary name and log targets)
pub const APP_NAME_LOWER: &str = "tabula";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".tabula";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tabula.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TABULA_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for the schema document path
pub const ENV_SCHEMA: &str = "TABULA_SCHEMA";

/// Environment variable for the output format (text or json)
pub const ENV_OUTPUT: &str = "TABULA_OUTPUT";

/// Environment variable for the log filter (falls back to RUST_LOG)
pub const ENV_LOG: &str = "TABULA_LOG";

// =============================================================================
// Input
// =============================================================================

/// Path argument that stands for standard input
pub const STDIN_PATH: &str = "-";
