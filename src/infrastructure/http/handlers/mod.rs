//! HTTP Handlers

mod chapter;
mod novel;
mod ping;

pub use chapter::*;
pub use novel::*;
pub use ping::*;
