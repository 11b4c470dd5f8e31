//! Small helpers shared by every dydump crate.

pub mod error;
