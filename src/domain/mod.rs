mod balance;
mod error;
mod expense;
mod group;
mod money;
mod settlement;
mod summary;

#[cfg(test)]
mod settlement_props;

pub use balance::*;
pub use error::*;
pub use expense::*;
pub use group::*;
pub use money::*;
pub use settlement::*;
pub use summary::*;
