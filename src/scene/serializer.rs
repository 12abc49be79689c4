//! Scene description serializer.
//!
//! Renders a scene snapshot into the external XML format consumed by the
//! downstream simulation tooling: one element per object, tagged by kind,
//! with the name as an attribute and pose as child elements.
//!
//! Serialization is a pure function of the snapshot — the same snapshot
//! always yields byte-identical output (stable element order, shortest
//! round-trip float formatting). Writing to disk builds the full document
//! first and then atomically replaces the destination file.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::SceneError;
use crate::scene::object::SceneObject;

/// Serialize a scene snapshot to an XML document string.
pub fn serialize(objects: &[SceneObject]) -> Result<String, SceneError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| SceneError::Serialize(e.to_string()))?;
    writer
        .write_event(Event::Start(BytesStart::new("scene")))
        .map_err(|e| SceneError::Serialize(e.to_string()))?;

    for object in objects {
        write_object(&mut writer, object)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("scene")))
        .map_err(|e| SceneError::Serialize(e.to_string()))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| SceneError::Serialize(e.to_string()))
}

fn write_object(writer: &mut Writer<Vec<u8>>, object: &SceneObject) -> Result<(), SceneError> {
    let tag = object.kind.xml_tag();

    let mut element = BytesStart::new(tag);
    element.push_attribute(("name", object.name.as_str()));
    writer
        .write_event(Event::Start(element))
        .map_err(|e| SceneError::Serialize(e.to_string()))?;

    let mut position = BytesStart::new("position");
    position.push_attribute(("x", fmt(object.position.x).as_str()));
    position.push_attribute(("y", fmt(object.position.y).as_str()));
    position.push_attribute(("z", fmt(object.position.z).as_str()));
    writer
        .write_event(Event::Empty(position))
        .map_err(|e| SceneError::Serialize(e.to_string()))?;

    let mut orientation = BytesStart::new("orientation");
    orientation.push_attribute(("w", fmt(object.orientation.s).as_str()));
    orientation.push_attribute(("x", fmt(object.orientation.v.x).as_str()));
    orientation.push_attribute(("y", fmt(object.orientation.v.y).as_str()));
    orientation.push_attribute(("z", fmt(object.orientation.v.z).as_str()));
    writer
        .write_event(Event::Empty(orientation))
        .map_err(|e| SceneError::Serialize(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| SceneError::Serialize(e.to_string()))
}

// Rust's f64 Display prints the shortest string that round-trips, which is
// both stable and readable; all callers go through here so the format has a
// single point of control.
fn fmt(value: f64) -> String {
    format!("{}", value)
}

/// Serialize the snapshot and atomically replace `path` with the result.
///
/// The document is written to a sibling temp file first and renamed over the
/// destination, so a crash mid-write never leaves a truncated scene file.
pub fn save_to_file(objects: &[SceneObject], path: &Path) -> Result<(), SceneError> {
    let document = serialize(objects)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    fs::write(&tmp, &document)?;
    fs::rename(&tmp, path)?;
    log::info!("scene saved to {}", path.display());
    Ok(())
}
