pub mod health;
pub mod login;
pub mod upstream;
