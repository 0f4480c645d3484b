//! Virtual coffee machine service
//!
//! The crate is split into the resource-accounting engine (`machine`), its
//! persistence collaborators (`storage`), runtime configuration (`config`),
//! shared error and metrics plumbing (`core`), health checks (`health`), and
//! the HTTP request layer (`web`) that exposes the engine.

pub mod config;
pub mod core;
pub mod health;
pub mod machine;
pub mod storage;
pub mod web;

pub use config::Settings;
pub use machine::{CoffeeMachine, CoffeeType, ContainerKind};
