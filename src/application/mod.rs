pub mod catalog;
mod dependencies;
pub mod lending;
pub mod reports;
pub mod reservation;

pub use dependencies::ServiceDependencies;
