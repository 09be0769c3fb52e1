pub mod api_probe;
pub mod bootstrap;
pub mod deps;
pub mod doctor;
pub mod error;
pub mod log;
pub mod model;
pub mod plan;
pub mod process;
pub mod runtime;

pub use bootstrap::{ensure_layout, prepare_and_launch, BootstrapReport, LayoutReport};
pub use error::BootstrapError;
pub use plan::BootstrapPlan;
pub use process::{CommandSpec, ProcessOutcome, ProcessRunner, SystemRunner};
pub use runtime::{RuntimeLocator, WhichLocator};
