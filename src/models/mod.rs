pub mod api;
pub mod question;
