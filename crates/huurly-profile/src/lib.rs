pub mod cli;
pub mod cmd;
pub mod store;

pub use store::JsonFileStore;
