use crate::scene::mesh::Mesh;
use crate::scene::transform::Transform;

/// Prefab node: plain data, children referenced by index.
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices into `Prefab::nodes`
    pub children_indices: Vec<usize>,
    pub mesh: Option<Mesh>,
}

impl PrefabNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A parsed model that is not in any scene yet.
///
/// `Prefab` holds no scene handles, so it can be built on a worker thread
/// and instantiated any number of times with
/// [`Scene::instantiate`](crate::scene::Scene::instantiate).
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub name: String,
    /// All nodes, flattened
    pub nodes: Vec<PrefabNode>,
    /// Indices of the root nodes in `nodes`
    pub root_indices: Vec<usize>,
    /// Animation clip names. Playback belongs to the host.
    pub animations: Vec<String>,
}

impl Prefab {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }

    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name.as_deref() == Some(name))
    }
}
