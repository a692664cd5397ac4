pub mod errors;
pub mod events;
pub mod requests;
pub mod room;
pub mod todo;

pub use errors::*;
pub use events::*;
pub use requests::*;
pub use room::*;
pub use todo::*;
