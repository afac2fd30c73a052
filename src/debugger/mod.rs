mod breakpoints;
mod context;
mod controller;
mod stepping;

pub use breakpoints::{Breakpoint, Breakpoints};
pub use context::{ExecutionContext, Frame};
pub use controller::{
    EventOutcome, ExecutionState, SuspendInfo, SuspendReason, TraceController,
};
pub use stepping::StepMode;
