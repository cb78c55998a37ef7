//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (health, invincibility, hurtbox)
//! - body: control/collision/locomotion флаги, weapon sockets, controller link

pub mod actor;
pub mod body;

// Re-exports для удобного импорта
pub use actor::*;
pub use body::*;
