//! Render orchestration for oxistyle.
//!
//! One [`Renderer::render`] call compiles one entry stylesheet through an
//! external [`StyleCompiler`](oxistyle_core::StyleCompiler), wiring in the
//! import callbacks from `oxistyle_core` and a logger that buffers warnings.
//!
//! # Examples
//!
//! ```no_run
//! use oxistyle_core::{RendererConfig, StyleCompiler};
//! use oxistyle_render::Renderer;
//! use std::path::Path;
//!
//! # async fn render<C: StyleCompiler>(compiler: C) -> anyhow::Result<()> {
//! let config = RendererConfig::new()
//!     .with_search_roots(["/project/styles"])
//!     .with_source_map(true);
//! let renderer = Renderer::new(config, compiler);
//!
//! let result = renderer.render(Path::new("/project/src/app.scss")).await?;
//! for file in &result.watch_files {
//!     println!("watching {}", file.display());
//! }
//! # Ok(())
//! # }
//! ```

mod logger;
mod renderer;
mod source_map;
mod types;

// Re-export public API
pub use logger::WarningCollector;
pub use renderer::Renderer;
pub use source_map::{inline_source_map_comment, rewrite_source_map};
pub use types::RenderResult;
