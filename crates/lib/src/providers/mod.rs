pub mod secrets;
pub mod warehouse;
