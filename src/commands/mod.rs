pub mod roles;
pub mod serve;

pub use roles::RolesCommand;
pub use serve::ServeCommand;
