//! Inner modules: script modules bundled with the host.
//!
//! ```text
//! ":net/sockets" ──► InnerModule("net/sockets")
//!                         │
//!                         ├─► "plugin-id" ──► "export const id = <N>" (fresh)
//!                         │
//!                         ├─► InnerModuleCache hit ──► bytes
//!                         │
//!                         └─► ModuleBundle::open("inner-module/net/sockets.js")
//!                             └─► non-empty? cache it
//! ```

mod bundle;
mod cache;

pub use bundle::{DirBundle, MapBundle, ModuleBundle, NoBundle};
pub use cache::{Content, InnerModuleCache};
