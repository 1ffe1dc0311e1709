//! Login and logout handlers.

mod login;
mod logout;

pub use login::{LoginCommand, LoginHandler, LoginResult};
pub use logout::{LogoutCommand, LogoutHandler};
