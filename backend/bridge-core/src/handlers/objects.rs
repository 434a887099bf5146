use crate::error::HandlerError;
use crate::handlers::params::{optional_bool, optional_str, optional_str_list, required_str};
use crate::handlers::{Handler, HandlerOutcome, Params};
use crate::scene::{SceneHost, SceneObject};
use crate::value::HostValue;

/// `list_objects {type?, only_view_layer?}`
pub struct ListObjects;

/// `get_object_info {name, other_attributes?, get_as_evaluated?}`
pub struct GetObjectInfo;

fn data_path(object: &SceneObject) -> String {
    format!("data.objects['{}']", object.name)
}

fn summary(object: &SceneObject, active: Option<&str>) -> HostValue {
    HostValue::map([
        ("name", HostValue::from(object.name.as_str())),
        ("type", HostValue::from(object.object_type.as_str())),
        ("data_path", HostValue::from(data_path(object))),
        ("active", HostValue::Bool(active == Some(object.name.as_str()))),
        ("visible", HostValue::Bool(object.visible)),
        ("location", HostValue::from(object.location)),
    ])
}

impl<H: SceneHost> Handler<H> for ListObjects {
    fn name(&self) -> &'static str {
        "list_objects"
    }

    fn call(&self, host: &mut H, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let object_type = optional_str(params, "type")?.filter(|t| !t.is_empty());
        let only_view_layer = optional_bool(params, "only_view_layer", false)?;

        let active = host.active_object();
        let objects: Vec<HostValue> = host
            .objects(only_view_layer)
            .into_iter()
            .filter(|object| object_type.is_none_or(|t| object.object_type == t))
            .map(|object| summary(object, active))
            .collect();

        let count = objects.len();
        let output = match object_type {
            Some(object_type) => format!("Found {count} objects of type {object_type}"),
            None => format!("Found {count} objects"),
        };

        Ok(HandlerOutcome::success(
            output,
            HostValue::map([
                ("objects", HostValue::List(objects)),
                ("total_count", HostValue::from(count)),
                ("filtered_type", HostValue::from(object_type)),
            ]),
        ))
    }
}

impl<H: SceneHost> Handler<H> for GetObjectInfo {
    fn name(&self) -> &'static str {
        "get_object_info"
    }

    fn call(&self, host: &mut H, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let name = required_str(params, "name")?;
        let requested = optional_str_list(params, "other_attributes")?;
        let as_evaluated = optional_bool(params, "get_as_evaluated", false)?;

        let object = if as_evaluated {
            host.evaluated_object(name)
        } else {
            host.object(name)
        };
        let object = object.ok_or_else(|| HandlerError::not_found(format!("Object not found: {name}")))?;

        let material_slots = HostValue::Map(
            object
                .material_slots
                .iter()
                .map(|slot| {
                    (
                        HostValue::from(slot.name.as_str()),
                        HostValue::map([
                            ("has_material", HostValue::Bool(slot.material.is_some())),
                            ("material", HostValue::from(slot.material.clone())),
                        ]),
                    )
                })
                .collect(),
        );

        // Attributes the object does not have are left out, not reported.
        let other_attributes = HostValue::map(
            requested
                .into_iter()
                .filter_map(|attr| object.attribute(attr).map(|value| (attr, value))),
        );

        let info = HostValue::map([
            ("name", HostValue::from(object.name.as_str())),
            ("type", HostValue::from(object.object_type.as_str())),
            ("data_path", HostValue::from(data_path(object))),
            (
                "active",
                HostValue::Bool(host.active_object() == Some(object.name.as_str())),
            ),
            ("visible", HostValue::Bool(object.visible)),
            ("location", HostValue::from(object.location)),
            ("rotation", HostValue::from(object.rotation)),
            ("scale", HostValue::from(object.scale)),
            ("dimensions", HostValue::from(object.dimensions)),
            ("material_slots", material_slots),
            ("modifiers", HostValue::from(object.modifiers.clone())),
            ("constraints", HostValue::from(object.constraints.clone())),
            ("children", HostValue::from(host.children_of(&object.name))),
            ("parent", HostValue::from(object.parent.clone())),
            ("vertex_groups", HostValue::from(object.vertex_groups.clone())),
            ("other_attributes", other_attributes),
        ]);

        Ok(HandlerOutcome::success(
            format!("Retrieved info for object: {}", object.name),
            HostValue::map([("object", info)]),
        ))
    }
}
