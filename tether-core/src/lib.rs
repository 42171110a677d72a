pub mod config;
pub mod declaration;
pub mod error;
pub mod plugin;
pub mod schema;
pub mod scope;
pub mod state;

pub use config::TetherConfig;
pub use declaration::{Declarations, PluginDeclaration};
pub use error::TetherError;
pub use plugin::Plugin;
pub use schema::Schema;
pub use scope::Scope;
pub use state::{ResourceData, ResourceState};
