pub mod candidate;
pub mod requirement;
pub mod squad;
pub mod state;

pub use candidate::*;
pub use requirement::*;
pub use squad::*;
pub use state::*;
