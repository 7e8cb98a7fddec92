pub use shakmaty;

pub mod explain;
pub mod position;
pub mod score;
pub mod strength;
