pub mod angles;
pub mod control;
pub mod interp;
pub mod rounding;
pub mod stoch;

pub use angles::*;
pub use control::*;
pub use interp::*;
pub use rounding::*;
pub use stoch::*;
