mod admin;
mod request_id;

pub use admin::{AdminAuth, admin_auth_middleware};
pub use request_id::{RequestId, request_id_middleware};
