//! HTTP Handlers

mod chapter;
mod generate;
mod knowledge;
mod model;
mod novel;
mod ping;
mod stream;
mod tasks;
mod websocket;

pub use chapter::*;
pub use generate::*;
pub use knowledge::*;
pub use model::*;
pub use novel::*;
pub use ping::*;
pub use stream::*;
pub use tasks::*;
pub use websocket::*;
