//! Asset Loading
//!
//! Textures, typeface fonts and glTF models are read and decoded on the
//! [`AssetServer`]'s worker runtime. Results are applied to storage only
//! when the frame loop calls [`AssetServer::pump`], so tick code never sees
//! an asset appear half way through a frame.

pub mod font;
pub mod io;
pub mod loaders;
pub mod prefab;
pub mod server;
pub mod storage;
pub mod texture;
pub mod tracker;

pub use font::{Font, Glyph, PlacedGlyph, TextLayout, TextOptions};
pub use io::FileAssetReader;
pub use loaders::GltfLoader;
pub use prefab::{Prefab, PrefabNode};
pub use server::{AssetServer, FontHandle, LoadId, PendingAsset, PrefabHandle, TextureHandle};
pub use storage::AssetStorage;
pub use texture::{ColorSpace, FilterMode, Sampler, Texture, TextureKind, WrapMode};
pub use tracker::{AssetEvent, LoadTracker};
