mod groups;
mod organizations;
mod permissions;
mod settings;
mod users;

pub use groups::*;
pub use organizations::*;
pub use permissions::*;
pub use settings::*;
pub use users::*;
