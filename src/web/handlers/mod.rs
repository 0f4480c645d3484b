pub mod coffee;
pub mod health;
pub mod management;
pub mod system;
