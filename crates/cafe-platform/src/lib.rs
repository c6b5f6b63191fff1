//! Platform service abstractions.
//!
//! The keyboard session and present path never call the console SDK
//! directly; they go through the traits in [`services`]. [`sim`] provides
//! an in-process implementation that records every call, used by the test
//! suites and the demo binary.

pub mod services;
pub mod sim;

pub use services::*;
pub use sim::{AppearSnapshot, SimCall, SimPlatform};

#[cfg(test)]
mod tests;
