//! Profiling hooks. Everything here compiles to nothing unless the `tracy`
//! feature is enabled.

#[cfg(not(feature = "tracy"))]
mod fallback;
#[cfg(feature = "tracy")]
mod tracy;

#[cfg(not(feature = "tracy"))]
pub(crate) use fallback::span;
#[cfg(not(feature = "tracy"))]
pub use fallback::{frame_mark, start};
#[cfg(feature = "tracy")]
pub(crate) use tracy::span;
#[cfg(feature = "tracy")]
pub use tracy::{frame_mark, start};
