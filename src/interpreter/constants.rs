// Default limits for the algorithm interpreter

/// Statements and loop iterations allowed per execution
/// Large enough for quadratic sorts on a few thousand elements
pub const DEFAULT_MAX_STEPS: u64 = 5_000_000;

/// Nested user function calls allowed before reporting a stack overflow
pub const DEFAULT_MAX_CALL_DEPTH: usize = 500;

/// Stack size of the thread that runs the interpreter (64 MiB)
/// The tree walker recurses on the native stack for every user call
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Longest array a program may build before `RangeError: Invalid array length`
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 1 << 20;

/// Hard ceiling for any configured array length and for playback snapshots
pub const MAX_ARRAY_LENGTH: usize = 1 << 24;

/// Longest string, in bytes, a concatenation may produce
pub const MAX_STRING_LENGTH: usize = 1 << 24;
