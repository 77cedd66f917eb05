//! Process exit codes

/// Command completed without findings
pub const EXIT_SUCCESS: i32 = 0;

/// Command completed but reported problems (for example alias collisions kept under
/// the first-wins policy)
pub const EXIT_WARNING: i32 = 1;

/// Command failed
pub const EXIT_ERROR: i32 = 2;
