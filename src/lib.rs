/// Builds a byte image out of emitted instruction bytes and symbolic
/// address references.
///
/// The steps are:
/// 1. **Emission** - a single linear pass appends bytes and records a fixup
///    for every 2-byte address operand that is only known symbolically
/// 2. **Resolution** - a final pass overwrites each fixup with the
///    little-endian address of its label
pub mod builder;

/// The fixed catalog of IX/IY probe routines and the assembly pass that
/// turns it into a CP/M COM image.
pub mod program;

/// Hexdump utility
pub mod hexdump;

/// Tracing setup
pub mod instrumentation;
