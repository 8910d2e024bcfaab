pub mod comment;
pub mod market;
pub mod portfolio;
pub mod trade;
pub mod trader;
pub mod user;
pub mod ws;

pub use comment::*;
pub use market::*;
pub use portfolio::*;
pub use trade::*;
pub use trader::*;
pub use user::*;
pub use ws::*;
