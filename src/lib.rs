pub mod biome;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod host;
pub mod import;
pub mod paint;
pub mod paths;
pub mod scene;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use command::{Command, CommandRegistry, ImportMapCommand};
pub use config::{BiomePalette, ImportOptions};
pub use document::MapDocument;
pub use error::ImportError;
pub use host::{Host, memory::SceneGraph};
pub use import::{ImportFailure, ImportReport, ImportStage, MapImport};
