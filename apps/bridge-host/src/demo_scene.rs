//! The scene the reference host starts with.

use bridge_core::scene::{Node, NodeGroup, NodeSocket, Scene, SceneObject, SocketDirection};
use bridge_core::value::HostValue;

pub fn demo_scene() -> Scene {
    let mut scene = Scene::new();
    scene
        .add_object(
            SceneObject::new("Cube", "MESH")
                .with_dimensions([2.0, 2.0, 2.0])
                .with_material("Material", Some("Material"))
                .with_modifier("Subdivision"),
        )
        .add_object(
            SceneObject::new("Camera", "CAMERA")
                .at([7.36, -6.93, 4.96])
                .with_attribute("lens", HostValue::Float(50.0)),
        )
        .add_object(SceneObject::new("Light", "LIGHT").at([4.08, 1.0, 5.9]));
    scene.set_active("Cube");

    scene.add_node_group(
        NodeGroup::new("Geometry Nodes", "GEOMETRY")
            .interface_socket(
                SocketDirection::Input,
                "Geometry",
                "NodeSocketGeometry",
                HostValue::None,
            )
            .interface_socket(
                SocketDirection::Output,
                "Geometry",
                "NodeSocketGeometry",
                HostValue::None,
            )
            .node(
                Node::new("Group Input", "NodeGroupInput")
                    .at(-200.0, 0.0)
                    .output(NodeSocket::new("Geometry", "GEOMETRY")),
            )
            .node(
                Node::new("Group Output", "NodeGroupOutput")
                    .at(200.0, 0.0)
                    .input(NodeSocket::new("Geometry", "GEOMETRY"))
                    .property("is_active_output", "BOOLEAN", HostValue::Bool(true)),
            )
            .link(("Group Input", "Geometry"), ("Group Output", "Geometry")),
    );
    scene
}
