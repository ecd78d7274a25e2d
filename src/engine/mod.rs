pub mod lifecycle;
pub mod sweep;
pub mod validator;
