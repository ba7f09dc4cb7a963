pub mod context;
pub mod memory;
pub mod registry;
pub mod state;
