pub mod history;
pub mod payload;
pub mod responses;
pub mod stream;

pub use history::*;
pub use payload::*;
pub use responses::*;
pub use stream::*;
