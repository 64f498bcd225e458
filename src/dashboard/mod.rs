//! The dashboard controller and the widgets it keeps in sync.
//!
//! `controller` owns the view and runs the train action, `poller` drives
//! the periodic status and stream refreshes, and the remaining modules are
//! the individual widgets.

pub mod charts;
pub mod controller;
pub mod form;
pub mod poller;
pub mod status;
pub mod table;
pub mod view;

pub use charts::*;
pub use controller::*;
pub use form::*;
pub use poller::*;
pub use status::*;
pub use table::*;
pub use view::*;
