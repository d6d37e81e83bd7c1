mod clock;
mod layout;
mod model;
mod overlap;
mod presenter;

pub use clock::{Clock, FixedClock, SystemClock};
pub use layout::*;
pub use model::*;
pub use overlap::{assign_slots, SlottedShift};
pub use presenter::*;
