pub mod errors;
pub mod filters;
pub mod media;
pub mod models;
pub mod progress;
pub mod repo;
pub mod scheduler;
pub mod seed;
pub mod state;
pub mod stats;
pub mod transfer;

pub use errors::*;
pub use filters::*;
pub use media::*;
pub use models::*;
pub use progress::*;
pub use repo::*;
pub use scheduler::*;
pub use state::*;
pub use stats::*;
pub use transfer::*;
