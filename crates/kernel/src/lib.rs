//! Module kernel for SHELF: layered settings, the module lifecycle trait,
//! and the registry that drives it.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
