//! 3MF (3D Manufacturing Format) support.
//!
//! A 3MF upload is a ZIP archive whose `3D/3dmodel.model` entry holds the
//! geometry as XML. Every `<mesh>` object in the model is loaded and the
//! triangles are concatenated into one facet buffer.
//!
//! Materials, colors, and build item transforms are ignored.

use std::io::{Cursor, Read, Seek, Write};

use mesh_types::{Facet, Point3, TriangleMesh};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{IoError, IoResult};

/// 3MF namespace URI.
const NAMESPACE_3MF: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// Parse a 3MF archive held in memory.
pub(crate) fn parse_3mf(bytes: &[u8]) -> IoResult<TriangleMesh> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IoError::invalid_content(format!("invalid ZIP archive: {e}")))?;

    let model = read_model_entry(&mut archive)?;
    let mesh = parse_model_xml(&model)?;

    debug!(triangles = mesh.facet_count(), "parsed 3MF model");
    Ok(mesh)
}

/// Read the 3D model entry from the archive.
fn read_model_entry<R: Read + Seek>(archive: &mut ZipArchive<R>) -> IoResult<String> {
    for name in ["3D/3dmodel.model", "3d/3dmodel.model", "3D/3DModel.model"] {
        if let Ok(mut entry) = archive.by_name(name) {
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            return Ok(content);
        }
    }

    // Some exporters use a different name; take the first `.model` entry.
    let fallback = archive
        .file_names()
        .find(|name| {
            std::path::Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("model"))
        })
        .map(str::to_owned);

    let Some(name) = fallback else {
        return Err(IoError::invalid_content(
            "3MF archive does not contain a model file",
        ));
    };

    let mut entry = archive
        .by_name(&name)
        .map_err(|e| IoError::invalid_content(format!("failed to read {name}: {e}")))?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

/// Vertices and index triples of the `<mesh>` currently being read.
#[derive(Default)]
struct ObjectBuffer {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
}

impl ObjectBuffer {
    /// Resolve indices into facets, appending them to `mesh`.
    fn flush_into(&mut self, mesh: &mut TriangleMesh) -> IoResult<()> {
        let count = self.vertices.len();
        for tri in self.triangles.drain(..) {
            let mut corners = [Point3::origin(); 3];
            for (corner, &index) in corners.iter_mut().zip(&tri) {
                *corner = *self
                    .vertices
                    .get(index)
                    .ok_or(IoError::VertexIndexOutOfRange { index, count })?;
            }
            mesh.facets.push(Facet::new(corners));
        }
        self.vertices.clear();
        Ok(())
    }
}

/// Parse the model XML content.
fn parse_model_xml(content: &str) -> IoResult<TriangleMesh> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut mesh = TriangleMesh::new();
    let mut object = ObjectBuffer::default();
    let mut in_mesh = false;
    let mut in_vertices = false;
    let mut in_triangles = false;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"mesh" => in_mesh = true,
                b"vertices" if in_mesh => in_vertices = true,
                b"triangles" if in_mesh => in_triangles = true,
                b"vertex" if in_vertices => object.vertices.push(parse_vertex(e)?),
                b"triangle" if in_triangles => object.triangles.push(parse_triangle(e)?),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"vertex" if in_vertices => object.vertices.push(parse_vertex(e)?),
                b"triangle" if in_triangles => object.triangles.push(parse_triangle(e)?),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"mesh" => {
                    object.flush_into(&mut mesh)?;
                    in_mesh = false;
                }
                b"vertices" => in_vertices = false,
                b"triangles" => in_triangles = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IoError::invalid_content(format!("XML parse error: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(mesh)
}

/// Look up one attribute value as UTF-8.
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> IoResult<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            let value = std::str::from_utf8(&attr.value).map_err(|e| {
                IoError::invalid_content(format!("invalid UTF-8 in attribute: {e}"))
            })?;
            return Ok(Some(value.to_owned()));
        }
    }
    Ok(None)
}

fn required<T: std::str::FromStr>(element: &BytesStart<'_>, name: &str) -> IoResult<T>
where
    T::Err: std::fmt::Display,
{
    let raw = attribute(element, name.as_bytes())?
        .ok_or_else(|| IoError::invalid_content(format!("missing `{name}` attribute")))?;
    raw.trim()
        .parse()
        .map_err(|e| IoError::invalid_content(format!("invalid `{name}` value {raw:?}: {e}")))
}

fn parse_vertex(element: &BytesStart<'_>) -> IoResult<Point3<f64>> {
    Ok(Point3::new(
        required(element, "x")?,
        required(element, "y")?,
        required(element, "z")?,
    ))
}

fn parse_triangle(element: &BytesStart<'_>) -> IoResult<[usize; 3]> {
    Ok([
        required(element, "v1")?,
        required(element, "v2")?,
        required(element, "v3")?,
    ])
}

/// Encode a mesh as a single-object 3MF archive.
///
/// Each facet contributes three vertices; no welding is attempted.
pub fn save_3mf(mesh: &TriangleMesh) -> IoResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_owned()),
        ("_rels/.rels", RELS_XML.to_owned()),
        ("3D/3dmodel.model", model_xml(mesh)?),
    ] {
        zip.start_file(name, options)
            .map_err(|e| IoError::invalid_content(format!("failed to create {name}: {e}")))?;
        zip.write_all(body.as_bytes())?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| IoError::invalid_content(format!("failed to finalize ZIP archive: {e}")))?;
    Ok(cursor.into_inner())
}

/// Content types XML for 3MF.
const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

/// Relationships XML for 3MF.
const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

fn xml_err(e: impl std::fmt::Display) -> IoError {
    IoError::invalid_content(format!("failed to write XML: {e}"))
}

fn model_xml(mesh: &TriangleMesh) -> IoResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("xmlns", NAMESPACE_3MF));
    model.push_attribute(("unit", "millimeter"));
    writer.write_event(Event::Start(model)).map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("resources")))
        .map_err(xml_err)?;

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", "1"));
    object.push_attribute(("type", "model"));
    writer.write_event(Event::Start(object)).map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("mesh")))
        .map_err(xml_err)?;

    writer
        .write_event(Event::Start(BytesStart::new("vertices")))
        .map_err(xml_err)?;
    for v in mesh.facets.iter().flat_map(|f| f.vertices.iter()) {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("x", format!("{:.6}", v.x).as_str()));
        vertex.push_attribute(("y", format!("{:.6}", v.y).as_str()));
        vertex.push_attribute(("z", format!("{:.6}", v.z).as_str()));
        writer.write_event(Event::Empty(vertex)).map_err(xml_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("vertices")))
        .map_err(xml_err)?;

    writer
        .write_event(Event::Start(BytesStart::new("triangles")))
        .map_err(xml_err)?;
    for i in 0..mesh.facet_count() {
        let mut triangle = BytesStart::new("triangle");
        triangle.push_attribute(("v1", (3 * i).to_string().as_str()));
        triangle.push_attribute(("v2", (3 * i + 1).to_string().as_str()));
        triangle.push_attribute(("v3", (3 * i + 2).to_string().as_str()));
        writer.write_event(Event::Empty(triangle)).map_err(xml_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("triangles")))
        .map_err(xml_err)?;

    for name in ["mesh", "object", "resources"] {
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::Start(BytesStart::new("build")))
        .map_err(xml_err)?;
    let mut item = BytesStart::new("item");
    item.push_attribute(("objectid", "1"));
    writer.write_event(Event::Empty(item)).map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("build")))
        .map_err(xml_err)?;

    writer
        .write_event(Event::End(BytesEnd::new("model")))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| IoError::invalid_content(format!("generated XML is not UTF-8: {e}")))
}
