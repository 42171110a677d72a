pub mod body;
pub mod error;
pub mod plugin;
pub mod resource;

pub use error::ReconcileError;
pub use plugin::PluginReconciler;
pub use resource::Resource;
