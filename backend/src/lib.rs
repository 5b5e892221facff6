pub mod clear;
pub mod context;
pub mod lwe;
pub mod value;

pub use clear::ClearContext;
pub use context::{governing_modulus, ContextError, HeContext};
pub use lwe::{LweContext, LweParameters};
pub use value::SlotValue;
