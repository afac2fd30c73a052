//! Interactive line-stepping debugger core: the execution-control state
//! machine that decides suspend-or-continue on every program-location event,
//! and the incremental viewport engine that keeps a large source buffer in a
//! small fixed-height code window. A plain terminal driver sits on top; the
//! event feed is anything implementing [`feed::EventSource`].

pub mod debugger;
pub mod errors;
pub mod executor;
pub mod feed;
pub mod location;
pub mod persist;
pub mod source;
pub mod viewport;
