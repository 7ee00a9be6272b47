//! Exit codes for trioctl

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when title or content is missing
pub const EXIT_USAGE: i32 = 64;

/// Exit code when the generation service is unavailable/unreachable
pub const EXIT_SERVICE_UNAVAILABLE: i32 = 70;

/// Exit code for unreadable or invalid configuration
pub const EXIT_CONFIG_ERROR: i32 = 78;
