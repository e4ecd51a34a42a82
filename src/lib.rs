//! Convert an OBJ mesh, with an optional texture or material library, into a
//! standalone HTML page that renders it with three.js.
//!
//! Assets are either referenced by their local paths or first published to
//! a Canvas file area ([`canvas::CanvasStore`]) and referenced by URL. When a
//! material library is published its texture declarations are rewritten to
//! the published URLs as well.

pub mod asset;
pub mod canvas;
pub mod context;
pub mod convert;
pub mod error;
pub mod loader;
pub mod persist;
pub mod preview;
pub mod resolver;
pub mod store;
pub mod template;
pub mod token;

pub use asset::{AssetPaths, AssetReference, ResolvedAssets};
pub use context::{build, RenderContext, RenderMode, ViewParameters};
pub use convert::{convert_local, convert_published, ConversionJob};
pub use error::{Error, Result};
pub use store::AssetStore;
