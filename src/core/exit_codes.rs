//! # Exit Codes
//!
//! Process exit codes for the deptrace CLI. Scripts and CI pipelines
//! branch on these, so the values are part of the public contract.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Target matched several equally ranked files
pub const EXIT_AMBIGUOUS: i32 = 2;

/// Dependency index missing, corrupt, stale, or unwritable
pub const EXIT_INDEX_FAILED: i32 = 3;

/// Target produced zero candidates (also used for unexpected failures)
pub const EXIT_RESOLVER_FAILED: i32 = 4;

/// Refactor plan rejected (collision, invalid destination, mixed usage in strict mode)
pub const EXIT_REFACTOR_BLOCKED: i32 = 5;

/// An operation exceeded its deadline
pub const EXIT_TIMEOUT: i32 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_AMBIGUOUS,
            EXIT_INDEX_FAILED,
            EXIT_RESOLVER_FAILED,
            EXIT_REFACTOR_BLOCKED,
            EXIT_TIMEOUT,
        ];

        for (i, &code1) in codes.iter().enumerate() {
            for (j, &code2) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(code1, code2, "exit codes at {} and {} collide", i, j);
                }
            }
        }
    }
}
