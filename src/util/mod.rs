mod context;
pub(crate) mod runnable;

pub use context::Context;
