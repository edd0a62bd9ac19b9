//! Streaming normal patcher
//!
//! Copies a mesh XML document event by event and rewrites only the
//! `<normal>` children of targeted vertex records. Everything else
//! (declaration, comments, whitespace, attribute order and quoting) is
//! written back exactly as read.

use hashbrown::HashMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::tree::TreeError;

const NORMAL_TAG: &[u8] = b"normal";
const BOM: &str = "\u{feff}";

/// Open element state; `Some` for a vertex record being patched
struct PendingVertex {
    normal: [f64; 3],
    written: bool,
}

/// Rewrite the normals of the vertex records addressed by `patches`
///
/// Keys are element ordinals as assigned by [`crate::tree::parse_document`].
/// A patched vertex without a `<normal>` child gets one appended.
pub fn apply_normal_patches(
    xml: &str,
    patches: &HashMap<usize, [f64; 3]>,
) -> Result<String, TreeError> {
    // The reader swallows a byte order mark; carry it over by hand
    let (bom, body) = match xml.strip_prefix(BOM) {
        Some(rest) => (BOM, rest),
        None => ("", xml),
    };

    let mut reader = Reader::from_str(body);
    let mut out = Vec::with_capacity(xml.len() + patches.len() * 48);
    out.extend_from_slice(bom.as_bytes());
    let mut writer = Writer::new(out);
    let mut open: Vec<Option<PendingVertex>> = Vec::new();
    let mut ordinal = 0usize;

    loop {
        let event = reader.read_event().map_err(|source| TreeError::Syntax {
            position: reader.buffer_position() as u64,
            source,
        })?;

        match event {
            Event::Start(e) => {
                let this = ordinal;
                ordinal += 1;

                if let Some(pending) = patch_target(&mut open, &e) {
                    writer.write_event(Event::Start(patched_normal(Some(&e), pending.normal)?))?;
                    pending.written = true;
                    open.push(None);
                    continue;
                }

                open.push(patches.get(&this).map(|&normal| PendingVertex {
                    normal,
                    written: false,
                }));
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                let this = ordinal;
                ordinal += 1;

                if let Some(pending) = patch_target(&mut open, &e) {
                    writer.write_event(Event::Empty(patched_normal(Some(&e), pending.normal)?))?;
                    pending.written = true;
                    continue;
                }

                match patches.get(&this) {
                    // Self-closing vertex record: expand it to hold the normal
                    Some(&normal) => {
                        writer.write_event(Event::Start(e.borrow()))?;
                        writer.write_event(Event::Empty(patched_normal(None, normal)?))?;
                        writer.write_event(Event::End(e.to_end()))?;
                    }
                    None => writer.write_event(Event::Empty(e))?,
                }
            }
            Event::End(e) => {
                if let Some(Some(pending)) = open.pop() {
                    if !pending.written {
                        writer.write_event(Event::Empty(patched_normal(None, pending.normal)?))?;
                    }
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// The patched vertex this tag is the `<normal>` of, if any
fn patch_target<'a>(
    open: &'a mut [Option<PendingVertex>],
    tag: &BytesStart<'_>,
) -> Option<&'a mut PendingVertex> {
    if tag.name().as_ref() != NORMAL_TAG {
        return None;
    }
    open.last_mut()?.as_mut()
}

/// Build a `<normal>` tag carrying `normal`, keeping any other attributes of `original`
fn patched_normal(
    original: Option<&BytesStart<'_>>,
    normal: [f64; 3],
) -> Result<BytesStart<'static>, TreeError> {
    let components = [("x", normal[0]), ("y", normal[1]), ("z", normal[2])];
    let mut written = [false; 3];

    let name = original
        .map(|e| String::from_utf8_lossy(e.name().as_ref()).into_owned())
        .unwrap_or_else(|| "normal".to_owned());
    let mut tag = BytesStart::new(name);

    if let Some(original) = original {
        for attr in original.attributes() {
            let attr = attr.map_err(|e| TreeError::Attribute {
                element: "normal".to_owned(),
                source: e.into(),
            })?;
            let slot = components
                .iter()
                .position(|(key, _)| key.as_bytes() == attr.key.as_ref());
            match slot {
                Some(i) => {
                    let (key, value) = components[i];
                    tag.push_attribute((key, format!("{value:.6}").as_str()));
                    written[i] = true;
                }
                None => tag.push_attribute(attr),
            }
        }
    }

    for (i, (key, value)) in components.into_iter().enumerate() {
        if !written[i] {
            tag.push_attribute((key, format!("{value:.6}").as_str()));
        }
    }

    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    #[test]
    fn test_no_patches_is_identity() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- exported -->\n<mesh>\n  <submeshes  >\n    <submesh material='a &amp; b' />\n  </submeshes>\n</mesh>\n";
        let out = apply_normal_patches(xml, &HashMap::new()).unwrap();
        assert_eq!(out, xml);
    }

    #[test]
    fn test_byte_order_mark_is_kept() {
        let xml = "\u{feff}<?xml version=\"1.0\"?>\n<vb><vertex><normal x=\"1\" y=\"0\" z=\"0\"/></vertex></vb>\n";
        assert_eq!(apply_normal_patches(xml, &HashMap::new()).unwrap(), xml);

        let mut patches = HashMap::new();
        patches.insert(1, [0.0, 0.0, 1.0]);
        let out = apply_normal_patches(xml, &patches).unwrap();
        assert_eq!(
            out,
            "\u{feff}<?xml version=\"1.0\"?>\n<vb><vertex><normal x=\"0.000000\" y=\"0.000000\" z=\"1.000000\"/></vertex></vb>\n"
        );
    }

    #[test]
    fn test_existing_normal_is_replaced_in_place() {
        let xml = r#"<vertexbuffer>
    <vertex>
        <position x="1" y="2" z="3" />
        <normal w="9" y="0.5" x="0.5" />
    </vertex>
</vertexbuffer>"#;
        let root = parse_document(xml).unwrap();
        let vertex = root.child("vertex").unwrap();

        let mut patches = HashMap::new();
        patches.insert(vertex.ordinal, [0.0, 0.0, 1.0]);
        let out = apply_normal_patches(xml, &patches).unwrap();

        let expected = r#"<vertexbuffer>
    <vertex>
        <position x="1" y="2" z="3" />
        <normal w="9" y="0.000000" x="0.000000" z="1.000000"/>
    </vertex>
</vertexbuffer>"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_missing_normal_is_appended() {
        let xml = r#"<vb><vertex><position x="0" y="0" z="0"/></vertex><vertex><position x="1" y="0" z="0"/></vertex></vb>"#;
        let root = parse_document(xml).unwrap();
        let second = root.children_named("vertex").nth(1).unwrap();

        let mut patches = HashMap::new();
        patches.insert(second.ordinal, [0.0, 1.0, 0.0]);
        let out = apply_normal_patches(xml, &patches).unwrap();

        assert_eq!(
            out,
            r#"<vb><vertex><position x="0" y="0" z="0"/></vertex><vertex><position x="1" y="0" z="0"/><normal x="0.000000" y="1.000000" z="0.000000"/></vertex></vb>"#
        );
    }

    #[test]
    fn test_self_closing_vertex_is_expanded() {
        let xml = r#"<vb><vertex/></vb>"#;
        let mut patches = HashMap::new();
        patches.insert(1, [1.0, 0.0, 0.0]);
        let out = apply_normal_patches(xml, &patches).unwrap();
        assert_eq!(
            out,
            r#"<vb><vertex><normal x="1.000000" y="0.000000" z="0.000000"/></vertex></vb>"#
        );
    }

    #[test]
    fn test_normal_outside_patched_vertex_is_untouched() {
        let xml = r#"<vb><vertex><normal x="5" y="5" z="5"/></vertex><vertex><normal x="5" y="5" z="5"/></vertex></vb>"#;
        let mut patches = HashMap::new();
        // Ordinal 3 is the second vertex
        patches.insert(3, [0.0, 0.0, -1.0]);
        let out = apply_normal_patches(xml, &patches).unwrap();
        assert_eq!(
            out,
            r#"<vb><vertex><normal x="5" y="5" z="5"/></vertex><vertex><normal x="0.000000" y="0.000000" z="-1.000000"/></vertex></vb>"#
        );
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(apply_normal_patches("<mesh><a></mesh>", &HashMap::new()).is_err());
    }
}
