pub mod point;
pub use point::*;
pub mod handle;
pub use handle::*;
pub mod earth;
pub use earth::*;
pub mod badge;
pub use badge::*;
