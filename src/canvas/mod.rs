pub mod dispatch;
pub mod payload;
pub mod registry;
pub mod runtime;
pub mod selection;
