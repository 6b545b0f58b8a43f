//! Ledger module containing mutations and the views that reconcile them

pub mod mutation;
pub mod view;

pub use mutation::*;
pub use view::*;
