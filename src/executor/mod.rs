mod runner;

pub use runner::{run_debugger, RunnerOptions};
