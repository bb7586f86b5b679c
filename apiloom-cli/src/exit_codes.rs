//! Process exit codes

pub const EXIT_SUCCESS: i32 = 0;

/// Completed, but with findings or a failing handler
pub const EXIT_WARNING: i32 = 1;

/// Bad input or a usage error
pub const EXIT_ERROR: i32 = 2;
