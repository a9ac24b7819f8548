pub mod decimal;
pub mod password;
pub mod token;
