pub mod api;
pub mod page;
pub mod server;
pub mod state;

pub use api::*;
pub use page::*;
pub use server::*;
pub use state::*;
