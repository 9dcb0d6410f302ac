mod work_unit;
pub use work_unit::{ActionLimits, WorkUnit, WorkUnitConfig};

mod dispatch;
pub use dispatch::{BackoffStrategy, DispatchPolicy};
