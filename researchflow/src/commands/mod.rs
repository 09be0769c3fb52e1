//! Subcommands.
//!
//!   launch: full bootstrap sequence, then the agent (default)
//!   check: read-only environment report
//!   seed: directories and default knowledge database only

pub mod check;
pub mod launch;
pub mod seed;

/// Banner printed before any work.
pub(crate) fn banner() {
    eprintln!("🚀 Research workflow agent v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Protein structure prediction and 3D visualization");
    eprintln!();
}
