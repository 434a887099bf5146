use crate::error::HandlerError;
use crate::handlers::params::required_str;
use crate::handlers::{Handler, HandlerOutcome, Params};
use crate::scene::{InterfaceSocket, Node, NodeGroup, NodeSocket, SceneHost, SocketDirection};
use crate::value::HostValue;

/// `list_node_groups {}`
pub struct ListNodeGroups;

/// `get_node_group_info {name}`
pub struct GetNodeGroupInfo;

const DEFAULT_NODE_COLOR: [f64; 3] = [0.6, 0.6, 0.6];

fn interface_socket(socket: &InterfaceSocket) -> HostValue {
    HostValue::map([
        ("type", HostValue::from(socket.socket_type.as_str())),
        ("description", HostValue::from(socket.description.as_str())),
        ("identifier", HostValue::from(socket.identifier.as_str())),
        ("name", HostValue::from(socket.name.as_str())),
        ("default_value", socket.default_value.clone()),
    ])
}

fn group_summary(group: &NodeGroup) -> HostValue {
    let sockets = |direction: SocketDirection| {
        HostValue::List(
            group
                .interface
                .iter()
                .filter(|socket| socket.direction == direction)
                .map(interface_socket)
                .collect(),
        )
    };

    HostValue::map([
        ("name", HostValue::from(group.name.as_str())),
        ("node_tree_type", HostValue::from(group.tree_type.as_str())),
        ("node_count", HostValue::from(group.nodes.len())),
        ("inputs", sockets(SocketDirection::Input)),
        ("outputs", sockets(SocketDirection::Output)),
    ])
}

/// A socket with the links attached to it. Input sockets list the output
/// they are fed from; output sockets list the inputs they feed.
fn node_socket(
    group: &NodeGroup,
    node: &Node,
    socket: &NodeSocket,
    direction: SocketDirection,
) -> HostValue {
    let links = group.links_for(&node.name, &socket.name, direction);

    let link_values = links
        .iter()
        .map(|link| {
            let (peer_node, peer_type, peer_socket) = match direction {
                SocketDirection::Input => (&link.from_node, "output", &link.from_socket),
                SocketDirection::Output => (&link.to_node, "input", &link.to_socket),
            };
            HostValue::map([
                ("node", HostValue::from(peer_node.as_str())),
                (
                    "socket",
                    HostValue::map([
                        ("type", HostValue::from(peer_type)),
                        ("name", HostValue::from(peer_socket.as_str())),
                    ]),
                ),
            ])
        })
        .collect();

    // A linked socket takes its value from the link, so it has no default.
    let default_value = if links.is_empty() {
        HostValue::from(socket.default_value.clone())
    } else {
        HostValue::None
    };

    HostValue::map([
        ("name", HostValue::from(socket.name.as_str())),
        ("description", HostValue::from(socket.description.as_str())),
        ("type", HostValue::from(socket.socket_type.as_str())),
        ("default_value", default_value),
        ("links", HostValue::List(link_values)),
    ])
}

fn node_detail(group: &NodeGroup, node: &Node) -> HostValue {
    let sockets = |sockets: &[NodeSocket], direction: SocketDirection| {
        HostValue::List(
            sockets
                .iter()
                .map(|socket| node_socket(group, node, socket, direction))
                .collect(),
        )
    };

    let properties = node
        .properties
        .iter()
        .map(|(name, property_type, value)| {
            HostValue::map([
                ("name", HostValue::from(name.as_str())),
                ("bl_rna_type", HostValue::from(property_type.as_str())),
                ("value", value.clone()),
            ])
        })
        .collect();

    HostValue::map([
        ("name", HostValue::from(node.name.as_str())),
        ("label", HostValue::from(node.label.as_str())),
        ("bl_idname", HostValue::from(node.id_name.as_str())),
        ("use_custom_color", HostValue::Bool(node.color.is_some())),
        (
            "color",
            HostValue::from(node.color.unwrap_or(DEFAULT_NODE_COLOR)),
        ),
        (
            "location",
            HostValue::List(node.location.iter().copied().map(HostValue::Float).collect()),
        ),
        ("mute", HostValue::Bool(node.mute)),
        ("parent", HostValue::from(node.parent.clone())),
        ("selection_status", HostValue::Bool(node.selected)),
        ("inputs", sockets(&node.inputs, SocketDirection::Input)),
        ("outputs", sockets(&node.outputs, SocketDirection::Output)),
        ("properties", HostValue::List(properties)),
    ])
}

impl<H: SceneHost> Handler<H> for ListNodeGroups {
    fn name(&self) -> &'static str {
        "list_node_groups"
    }

    fn call(&self, host: &mut H, _params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let groups: Vec<HostValue> = host.node_groups().into_iter().map(group_summary).collect();
        let count = groups.len();

        Ok(HandlerOutcome::success(
            format!("Found {count} node groups"),
            HostValue::map([
                ("node_groups", HostValue::List(groups)),
                ("total_count", HostValue::from(count)),
            ]),
        ))
    }
}

impl<H: SceneHost> Handler<H> for GetNodeGroupInfo {
    fn name(&self) -> &'static str {
        "get_node_group_info"
    }

    fn call(&self, host: &mut H, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let name = required_str(params, "name")?;
        let group = host
            .node_group(name)
            .ok_or_else(|| HandlerError::not_found(format!("Node group not found: {name}")))?;

        let nodes: Vec<HostValue> = group
            .nodes
            .iter()
            .map(|node| node_detail(group, node))
            .collect();
        let total_nodes = nodes.len();
        let total_links = group.links.len();

        Ok(HandlerOutcome::success(
            format!(
                "Retrieved detailed info for node group '{}' with {total_nodes} nodes and {total_links} links",
                group.name
            ),
            HostValue::map([
                ("node_group_name", HostValue::from(group.name.as_str())),
                ("node_tree_type", HostValue::from(group.tree_type.as_str())),
                ("nodes", HostValue::List(nodes)),
                ("total_nodes", HostValue::from(total_nodes)),
                ("total_links", HostValue::from(total_links)),
            ]),
        ))
    }
}
