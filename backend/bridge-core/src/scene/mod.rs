//! Host object graph as seen by the built-in handlers.
//!
//! [`SceneHost`] is the read surface handlers need. [`Scene`] is a plain
//! in-memory implementation used by the reference host and the tests; a
//! real embedding implements the trait over its own object graph.

mod model;

pub use model::{
    InterfaceSocket, MaterialSlot, Node, NodeGroup, NodeLink, NodeSocket, SceneObject,
    SocketDirection,
};

/// Read access to the host's scene. Only ever called on the host thread.
pub trait SceneHost {
    /// Objects in scene order. With `only_view_layer`, objects excluded
    /// from the active view layer are left out.
    fn objects(&self, only_view_layer: bool) -> Vec<&SceneObject>;

    fn object(&self, name: &str) -> Option<&SceneObject>;

    /// The object as it looks after modifiers and constraints are applied.
    /// Hosts without an evaluation step return the stored object.
    fn evaluated_object(&self, name: &str) -> Option<&SceneObject> {
        self.object(name)
    }

    /// Name of the active object, if any.
    fn active_object(&self) -> Option<&str>;

    /// Names of objects parented to `name`.
    fn children_of(&self, name: &str) -> Vec<&str>;

    fn node_groups(&self) -> Vec<&NodeGroup>;

    fn node_group(&self, name: &str) -> Option<&NodeGroup>;
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    active: Option<String>,
    node_groups: Vec<NodeGroup>,
    evaluated: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object, replacing any existing object with the same name.
    pub fn add_object(&mut self, object: SceneObject) -> &mut Self {
        match self.objects.iter_mut().find(|o| o.name == object.name) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
        self
    }

    /// Records the evaluated form of an existing object. Returns false if
    /// no object with that name exists.
    pub fn set_evaluated(&mut self, object: SceneObject) -> bool {
        if !self.objects.iter().any(|o| o.name == object.name) {
            return false;
        }
        match self.evaluated.iter_mut().find(|o| o.name == object.name) {
            Some(existing) => *existing = object,
            None => self.evaluated.push(object),
        }
        true
    }

    /// Marks `name` active. Returns false if no such object exists.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.objects.iter().any(|o| o.name == name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn add_node_group(&mut self, group: NodeGroup) -> &mut Self {
        match self.node_groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => *existing = group,
            None => self.node_groups.push(group),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl SceneHost for Scene {
    fn objects(&self, only_view_layer: bool) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|o| !only_view_layer || o.in_view_layer)
            .collect()
    }

    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn evaluated_object(&self, name: &str) -> Option<&SceneObject> {
        self.evaluated
            .iter()
            .find(|o| o.name == name)
            .or_else(|| self.object(name))
    }

    fn active_object(&self) -> Option<&str> {
        self.active.as_deref()
    }

    fn children_of(&self, name: &str) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|o| o.parent.as_deref() == Some(name))
            .map(|o| o.name.as_str())
            .collect()
    }

    fn node_groups(&self) -> Vec<&NodeGroup> {
        self.node_groups.iter().collect()
    }

    fn node_group(&self, name: &str) -> Option<&NodeGroup> {
        self.node_groups.iter().find(|g| g.name == name)
    }
}
