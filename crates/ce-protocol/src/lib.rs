pub mod emission;
pub mod quantity;
pub mod vocabulary;

pub use emission::*;
pub use quantity::*;
