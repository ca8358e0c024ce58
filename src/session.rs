pub(crate) mod compositor;
pub(crate) mod engine;
pub(crate) mod scheduler;
