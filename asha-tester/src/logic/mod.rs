pub mod autopilot;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use autopilot::Strategy;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
