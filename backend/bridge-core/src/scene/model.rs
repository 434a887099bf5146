use crate::value::HostValue;

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSlot {
    pub name: String,
    pub material: Option<String>,
}

/// One object in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    /// Host type tag such as `MESH`, `CAMERA` or `LIGHT`.
    pub object_type: String,
    pub location: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub dimensions: [f64; 3],
    pub visible: bool,
    pub in_view_layer: bool,
    pub parent: Option<String>,
    pub material_slots: Vec<MaterialSlot>,
    pub modifiers: Vec<String>,
    pub constraints: Vec<String>,
    pub vertex_groups: Vec<String>,
    /// Extra host attributes reachable through `other_attributes`.
    pub attributes: Vec<(String, HostValue)>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            dimensions: [0.0; 3],
            visible: true,
            in_view_layer: true,
            parent: None,
            material_slots: Vec::new(),
            modifiers: Vec::new(),
            constraints: Vec::new(),
            vertex_groups: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn at(mut self, location: [f64; 3]) -> Self {
        self.location = location;
        self
    }

    pub fn with_dimensions(mut self, dimensions: [f64; 3]) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_material(mut self, slot: impl Into<String>, material: Option<&str>) -> Self {
        self.material_slots.push(MaterialSlot {
            name: slot.into(),
            material: material.map(str::to_string),
        });
        self
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: HostValue) -> Self {
        self.attributes.push((name.into(), value));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn excluded_from_view_layer(mut self) -> Self {
        self.in_view_layer = false;
        self
    }

    /// Resolves an attribute by name: built-in transform and identity
    /// fields first, then the extra attributes.
    pub fn attribute(&self, name: &str) -> Option<HostValue> {
        match name {
            "name" => Some(HostValue::from(self.name.as_str())),
            "type" => Some(HostValue::from(self.object_type.as_str())),
            "location" => Some(HostValue::from(self.location)),
            "rotation_euler" => Some(HostValue::from(self.rotation)),
            "scale" => Some(HostValue::from(self.scale)),
            "dimensions" => Some(HostValue::from(self.dimensions)),
            "hide_viewport" => Some(HostValue::Bool(!self.visible)),
            "parent" => Some(HostValue::from(self.parent.clone())),
            _ => self
                .attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketDirection {
    Input,
    Output,
}

/// A socket on a node group's external interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSocket {
    pub name: String,
    pub identifier: String,
    pub socket_type: String,
    pub description: String,
    pub direction: SocketDirection,
    pub default_value: HostValue,
}

/// A socket on a node inside a group.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSocket {
    pub name: String,
    pub description: String,
    pub socket_type: String,
    pub default_value: Option<HostValue>,
}

impl NodeSocket {
    pub fn new(name: impl Into<String>, socket_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            socket_type: socket_type.into(),
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: HostValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub label: String,
    /// Host type identifier of the node, e.g. `GeometryNodeMeshCube`.
    pub id_name: String,
    pub location: [f64; 2],
    pub color: Option<[f64; 3]>,
    pub mute: bool,
    pub selected: bool,
    pub parent: Option<String>,
    pub inputs: Vec<NodeSocket>,
    pub outputs: Vec<NodeSocket>,
    pub properties: Vec<(String, String, HostValue)>,
}

impl Node {
    pub fn new(name: impl Into<String>, id_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            id_name: id_name.into(),
            location: [0.0; 2],
            color: None,
            mute: false,
            selected: false,
            parent: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.location = [x, y];
        self
    }

    pub fn input(mut self, socket: NodeSocket) -> Self {
        self.inputs.push(socket);
        self
    }

    pub fn output(mut self, socket: NodeSocket) -> Self {
        self.outputs.push(socket);
        self
    }

    /// Adds a node property with its host property type (`ENUM`, `FLOAT`, ...).
    pub fn property(
        mut self,
        name: impl Into<String>,
        property_type: impl Into<String>,
        value: HostValue,
    ) -> Self {
        self.properties.push((name.into(), property_type.into(), value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLink {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroup {
    pub name: String,
    /// Tree type tag such as `GEOMETRY` or `SHADER`.
    pub tree_type: String,
    pub interface: Vec<InterfaceSocket>,
    pub nodes: Vec<Node>,
    pub links: Vec<NodeLink>,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>, tree_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree_type: tree_type.into(),
            interface: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn interface_socket(
        mut self,
        direction: SocketDirection,
        name: impl Into<String>,
        socket_type: impl Into<String>,
        default_value: HostValue,
    ) -> Self {
        let name = name.into();
        let identifier = format!("Socket_{}", self.interface.len());
        self.interface.push(InterfaceSocket {
            identifier,
            name,
            socket_type: socket_type.into(),
            description: String::new(),
            direction,
            default_value,
        });
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Connects `(node, socket)` pairs, output to input.
    pub fn link(mut self, from: (&str, &str), to: (&str, &str)) -> Self {
        self.links.push(NodeLink {
            from_node: from.0.to_string(),
            from_socket: from.1.to_string(),
            to_node: to.0.to_string(),
            to_socket: to.1.to_string(),
        });
        self
    }

    /// Links touching the given socket of `node`.
    pub fn links_for(
        &self,
        node: &str,
        socket: &str,
        direction: SocketDirection,
    ) -> Vec<&NodeLink> {
        self.links
            .iter()
            .filter(|link| match direction {
                SocketDirection::Input => link.to_node == node && link.to_socket == socket,
                SocketDirection::Output => link.from_node == node && link.from_socket == socket,
            })
            .collect()
    }
}
