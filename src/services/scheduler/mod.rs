pub mod diff;
pub mod refresh;
pub mod store;
pub mod types;
pub mod validator;

pub use store::TaskStore;
pub use types::{Assignment, DecodedImage, DecodedProject, Rgb, Snapshot, Unit};
