//! Asset Loading Tests
//!
//! Tests for:
//! - AssetStorage: add, get, remove, add_with_uuid deduplication
//! - Texture loading: decode, events, missing files
//! - Cube textures: face assembly and size mismatches
//! - Typeface fonts: parsing, layout, centering
//! - glTF models: node tree and bounds without vertex buffers
//! - PendingAsset: try_take, async wait, shutdown cancellation

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use orrery::assets::storage::AssetStorage;
use orrery::assets::{AssetServer, ColorSpace, Font, GltfLoader, TextOptions, TextureKind};
use orrery::errors::AssetError;
use orrery::scene::Geometry;
use orrery::AssetEvent;
use slotmap::new_key_type;
use uuid::Uuid;

new_key_type! { struct TestHandle; }

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Helpers
// ============================================================================

/// A scratch directory under the system temp dir, removed on drop.
struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("orrery-assets-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.0.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn write_png(&self, name: &str, size: u32, color: [u8; 4]) -> PathBuf {
        let path = self.0.join(name);
        RgbaImage::from_pixel(size, size, Rgba(color)).save(&path).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn server(dir: &TempDir) -> AssetServer {
    AssetServer::new(2).unwrap().with_root(dir.path())
}

const TYPEFACE: &str = r#"{
    "familyName": "Test Sans",
    "resolution": 1000,
    "boundingBox": { "xMin": 0, "xMax": 600, "yMin": -200, "yMax": 800 },
    "underlineThickness": 50,
    "underlinePosition": -100,
    "glyphs": {
        "A": { "ha": 600, "x_min": 0, "x_max": 600, "o": "m 0 0 l 300 800 l 600 0" },
        " ": { "ha": 300, "x_min": 0, "x_max": 0 }
    }
}"#;

/// Two nodes, one mesh, and a POSITION accessor with bounds but no buffer.
const MODEL: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "nodes": [0] } ],
    "nodes": [
        { "name": "Root", "translation": [0.0, 1.0, 0.0], "children": [1] },
        { "name": "Hull", "mesh": 0, "scale": [2.0, 2.0, 2.0] }
    ],
    "meshes": [
        { "primitives": [ { "attributes": { "POSITION": 0 } } ] }
    ],
    "accessors": [
        {
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [-1.0, 0.0, -0.5],
            "max": [1.0, 2.0, 0.5]
        }
    ]
}"#;

// ============================================================================
// AssetStorage
// ============================================================================

#[test]
fn storage_add_get_and_remove() {
    let storage = AssetStorage::<TestHandle, String>::new();
    let handle = storage.add("hello".to_string());
    assert_eq!(&*storage.get(handle).unwrap(), "hello");
    assert_eq!(storage.len(), 1);

    let removed = storage.remove(handle).unwrap();
    assert_eq!(&*removed, "hello");
    assert!(storage.get(handle).is_none());
    assert!(storage.is_empty());
}

#[test]
fn storage_add_with_uuid_deduplicates() {
    let storage = AssetStorage::<TestHandle, i32>::new();
    let uuid = Uuid::new_v4();
    let first = storage.add_with_uuid(uuid, 1);
    let second = storage.add_with_uuid(uuid, 2);

    assert_eq!(first, second);
    assert_eq!(*storage.get(first).unwrap(), 1);
    assert_eq!(storage.get_handle_by_uuid(&uuid), Some(first));
}

#[test]
fn storage_remove_clears_uuid_lookup() {
    let storage = AssetStorage::<TestHandle, i32>::new();
    let uuid = Uuid::new_v4();
    let handle = storage.add_with_uuid(uuid, 7);

    storage.remove(handle);
    assert!(storage.get_by_uuid(&uuid).is_none());
    assert!(storage.get_handle_by_uuid(&uuid).is_none());
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn texture_load_resolves_after_pump() {
    let dir = TempDir::new();
    dir.write_png("red.png", 4, [255, 0, 0, 255]);
    let mut assets = server(&dir);

    let mut pending = assets.load_texture("red.png", ColorSpace::Srgb);
    assert!(pending.try_take().is_none(), "nothing resolves before a pump");

    let events = assets.wait_for_loads(WAIT);
    let handle = pending.try_take().unwrap().unwrap();
    assert!(pending.is_taken());
    assert!(pending.try_take().is_none());

    let texture = assets.textures.get(handle).unwrap();
    assert_eq!((texture.width, texture.height), (4, 4));
    assert_eq!(texture.kind, TextureKind::D2);
    assert_eq!(texture.pixel(1, 2), Some([255, 0, 0, 255]));

    assert!(matches!(events.first(), Some(AssetEvent::Started { .. })));
    assert!(events.iter().any(
        |e| matches!(e, AssetEvent::Progress { loaded, total, .. } if loaded == total && *total > 0)
    ));
    assert!(events.iter().any(|e| matches!(e, AssetEvent::Loaded { .. })));
    assert_eq!(
        events.last(),
        Some(&AssetEvent::AllSettled {
            loaded: 1,
            failed: 0
        })
    );
    assert!(!assets.is_loading());
    assert!((assets.tracker().progress() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn missing_texture_fails_with_not_found() {
    let dir = TempDir::new();
    let mut assets = server(&dir);

    let mut pending = assets.load_texture("nope.png", ColorSpace::Srgb);
    let events = assets.wait_for_loads(WAIT);

    match pending.try_take() {
        Some(Err(AssetError::NotFound(path))) => assert!(path.ends_with("nope.png")),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(events.iter().any(|e| matches!(e, AssetEvent::Failed { .. })));
    assert_eq!(assets.tracker().items_failed(), 1);
    assert_eq!(assets.tracker().items_loaded(), 0);
}

#[test]
fn garbage_texture_fails_to_decode() {
    let dir = TempDir::new();
    dir.write("broken.png", b"definitely not a png");
    let mut assets = server(&dir);

    let mut pending = assets.load_texture("broken.png", ColorSpace::Linear);
    assets.wait_for_loads(WAIT);

    assert!(matches!(
        pending.try_take(),
        Some(Err(AssetError::ImageDecode(_)))
    ));
}

#[test]
fn cube_texture_assembles_six_faces() {
    let dir = TempDir::new();
    let names = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];
    for (i, name) in names.iter().enumerate() {
        dir.write_png(name, 2, [i as u8 * 40, 0, 0, 255]);
    }
    let mut assets = server(&dir);

    let mut pending = assets.load_cube_texture(names, ColorSpace::Srgb);
    assets.wait_for_loads(WAIT);

    let handle = pending.try_take().unwrap().unwrap();
    let cube = assets.textures.get(handle).unwrap();
    assert_eq!(cube.kind, TextureKind::Cube);
    assert_eq!(cube.face_count(), 6);
    assert_eq!(cube.face(3).unwrap()[0], 120);
}

#[test]
fn cube_texture_rejects_mismatched_faces() {
    let dir = TempDir::new();
    let names = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];
    for name in &names[..5] {
        dir.write_png(name, 2, [0, 0, 255, 255]);
    }
    dir.write_png(names[5], 4, [0, 0, 255, 255]);
    let mut assets = server(&dir);

    let mut pending = assets.load_cube_texture(names, ColorSpace::Srgb);
    assets.wait_for_loads(WAIT);

    assert!(matches!(pending.try_take(), Some(Err(AssetError::CubeMap(_)))));
}

// ============================================================================
// Fonts
// ============================================================================

#[test]
fn font_layout_advances_and_bounds() {
    let font = Font::from_json_slice(TYPEFACE.as_bytes()).unwrap();
    let options = TextOptions {
        size: 1.0,
        depth: 0.2,
        ..TextOptions::default()
    };

    let layout = font.layout("A A", options);

    assert_eq!(layout.glyphs.len(), 3);
    assert!((layout.glyphs[2].offset.x - 0.9).abs() < 1e-5);
    assert!((layout.width() - 1.5).abs() < 1e-5);
    assert_eq!(layout.visible_glyph_count(&font), 2);
}

#[test]
fn font_layout_center_moves_bounds_to_origin() {
    let font = Font::from_json_slice(TYPEFACE.as_bytes()).unwrap();
    let mut layout = font.layout(
        "AA",
        TextOptions {
            size: 1.0,
            depth: 0.2,
            ..TextOptions::default()
        },
    );

    layout.center();

    assert!(layout.bounds.center().length() < 1e-5);
    assert!((layout.glyphs[0].offset.x + 0.6).abs() < 1e-5);
}

#[test]
fn font_missing_glyph_is_skipped_without_fallback() {
    let font = Font::from_json_slice(TYPEFACE.as_bytes()).unwrap();
    let layout = font.layout("AZ", TextOptions::default());
    assert_eq!(layout.glyphs.len(), 1);
}

#[test]
fn font_rejects_zero_resolution() {
    let json = TYPEFACE.replace("\"resolution\": 1000", "\"resolution\": 0");
    assert!(matches!(
        Font::from_json_slice(json.as_bytes()),
        Err(AssetError::Format(_))
    ));
}

#[test]
fn font_loads_through_server() {
    let dir = TempDir::new();
    dir.write("test_sans.typeface.json", TYPEFACE.as_bytes());
    let mut assets = server(&dir);

    let mut pending = assets.load_font("test_sans.typeface.json");
    assets.wait_for_loads(WAIT);

    let handle = pending.try_take().unwrap().unwrap();
    let font = assets.fonts.get(handle).unwrap();
    assert_eq!(font.family_name, "Test Sans");
    assert!(font.glyph('A').is_some());
}

// ============================================================================
// glTF Models
// ============================================================================

#[test]
fn gltf_prefab_reads_tree_and_bounds() {
    let prefab = GltfLoader::load_prefab(MODEL.as_bytes(), "Ship").unwrap();

    assert_eq!(prefab.name, "Ship");
    assert_eq!(prefab.nodes.len(), 2);
    assert_eq!(prefab.root_indices, vec![0]);
    assert_eq!(prefab.mesh_count(), 1);

    let root = &prefab.nodes[prefab.find_node("Root").unwrap()];
    assert_eq!(root.children_indices, vec![1]);
    assert!((root.transform.position.y - 1.0).abs() < 1e-6);

    let hull = &prefab.nodes[prefab.find_node("Hull").unwrap()];
    match &hull.mesh.as_ref().unwrap().geometry {
        Geometry::Model {
            bounds,
            vertex_count,
        } => {
            assert_eq!(*vertex_count, 3);
            assert!((bounds.size().y - 2.0).abs() < 1e-6);
        }
        other => panic!("expected model geometry, got {other:?}"),
    }
}

#[test]
fn gltf_rejects_malformed_document() {
    assert!(matches!(
        GltfLoader::load_prefab(b"{ not gltf", "Bad"),
        Err(AssetError::Format(_))
    ));
}

#[test]
fn model_wait_resolves_after_pump() {
    let dir = TempDir::new();
    dir.write("ship.gltf", MODEL.as_bytes());
    let mut assets = server(&dir);

    let pending = assets.load_model("ship.gltf");
    assets.wait_for_loads(WAIT);

    let handle = pollster::block_on(pending.wait()).unwrap();
    let prefab = assets.prefabs.get(handle).unwrap();
    assert_eq!(prefab.mesh_count(), 1);
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn loads_after_shutdown_are_cancelled() {
    let dir = TempDir::new();
    dir.write_png("late.png", 2, [0, 255, 0, 255]);
    let mut assets = server(&dir);
    assets.shutdown();

    let mut pending = assets.load_texture("late.png", ColorSpace::Srgb);
    let events = assets.pump();

    assert!(matches!(pending.try_take(), Some(Err(AssetError::Cancelled(_)))));
    assert!(events.iter().any(|e| matches!(e, AssetEvent::Failed { .. })));
    assert!(!assets.is_loading());
}
