mod health_check;
mod signups;
pub use health_check::*;
pub use signups::*;
