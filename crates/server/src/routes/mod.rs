pub mod health;
pub mod suggest;
