pub mod follow_up;
pub mod notification;
pub mod role;
pub mod session;
pub mod settings;
pub mod temporal;
pub mod tour;
pub mod validation;
