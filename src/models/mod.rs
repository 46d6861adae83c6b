mod deletion;
mod group;
mod organization;
mod permission;
mod user;
mod validators;

pub use deletion::*;
pub use group::*;
pub use organization::*;
pub use permission::*;
pub use user::*;
pub use validators::*;
