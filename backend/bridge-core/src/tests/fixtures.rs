//! Shared test fixtures: a small scene and a host thread that drains a
//! queue the way a real host's idle tick would.

use crate::scene::{NodeGroup, Node, NodeSocket, Scene, SceneObject, SocketDirection};
use crate::task_queue::{IdleTick, TaskQueue};
use crate::value::HostValue;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) fn sample_scene() -> Scene {
    let mut scene = Scene::new();
    scene
        .add_object(
            SceneObject::new("Cube", "MESH")
                .at([0.0, 0.0, 1.0])
                .with_dimensions([2.0, 2.0, 2.0])
                .with_material("Material", Some("Steel"))
                .with_modifier("Bevel")
                .with_attribute("pass_index", HostValue::Int(3)),
        )
        .add_object(SceneObject::new("Camera", "CAMERA").at([7.0, -6.0, 5.0]))
        .add_object(
            SceneObject::new("Light", "LIGHT")
                .at([4.0, 1.0, 6.0])
                .with_parent("Cube")
                .excluded_from_view_layer(),
        );
    scene.set_active("Cube");
    scene.add_node_group(
        NodeGroup::new("Scatter", "GEOMETRY")
            .interface_socket(
                SocketDirection::Input,
                "Density",
                "NodeSocketFloat",
                HostValue::Float(10.0),
            )
            .interface_socket(
                SocketDirection::Output,
                "Geometry",
                "NodeSocketGeometry",
                HostValue::None,
            )
            .node(
                Node::new("Distribute", "GeometryNodeDistributePointsOnFaces")
                    .input(NodeSocket::new("Density", "VALUE").with_default(HostValue::Float(10.0)))
                    .output(NodeSocket::new("Points", "GEOMETRY"))
                    .property("distribute_method", "ENUM", HostValue::from("RANDOM")),
            )
            .node(
                Node::new("Instance", "GeometryNodeInstanceOnPoints")
                    .at(200.0, 0.0)
                    .input(NodeSocket::new("Points", "GEOMETRY"))
                    .output(NodeSocket::new("Instances", "GEOMETRY")),
            )
            .link(("Distribute", "Points"), ("Instance", "Points")),
    );
    scene
}

/// A thread owning `host` that drains `queue` until dropped.
pub(crate) struct HostThread {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl HostThread {
    pub(crate) fn spawn<H: Send + 'static>(queue: Arc<TaskQueue<H>>, mut host: H) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            let mut idle = IdleTick::new(queue);
            while !flag.load(Ordering::SeqCst) {
                idle.tick(&mut host);
                thread::sleep(Duration::from_millis(1));
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }
}

impl Drop for HostThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
