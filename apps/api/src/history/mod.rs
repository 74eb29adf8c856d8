// Feedback history: file-backed append-only log of past evaluations plus the
// digest fed back into each new prompt.

pub mod store;
pub mod summary;
