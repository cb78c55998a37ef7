//! Combat systems (ECS dispatch над state machines)

pub mod combo;
pub mod damage;
pub mod entrance;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod damage_tests;

// Re-export all systems
pub use combo::*;
pub use damage::*;
pub use entrance::*;
