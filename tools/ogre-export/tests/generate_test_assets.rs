//! Test asset generation
//!
//! Builds small Ogre mesh XML documents for integration testing.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Vertex buffer holding positions (and optionally normals) for `count` vertices
fn position_buffer(count: usize, normals: bool) -> String {
    let mut xml = format!(r#"<vertexbuffer positions="true" normals="{normals}">"#);
    for i in 0..count {
        let _ = write!(
            xml,
            r#"<vertex><position x="{}" y="{}" z="0"/>"#,
            i % 2,
            i / 2
        );
        if normals {
            xml.push_str(r#"<normal x="0" y="0" z="1"/>"#);
        }
        xml.push_str("</vertex>");
    }
    xml.push_str("</vertexbuffer>");
    xml
}

/// Separate vertex buffer with one texture coordinate set
fn uv_buffer(count: usize) -> String {
    let mut xml = String::from(r#"<vertexbuffer texture_coords="1">"#);
    for i in 0..count {
        let _ = write!(xml, r#"<vertex><texcoord u="{}" v="0.25"/></vertex>"#, i % 2);
    }
    xml.push_str("</vertexbuffer>");
    xml
}

/// Shared block of 3 vertices used by submesh 0, then local blocks of
/// 4 and 3 vertices for submeshes 1 and 2. Every block has normals and UVs.
pub fn shared_and_local_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mesh>
    <sharedgeometry vertexcount="3">{shared_pos}{shared_uv}</sharedgeometry>
    <submeshes>
        <submesh material="Shared" usesharedvertices="true">
            <faces count="1"><face v1="0" v2="1" v3="2"/></faces>
        </submesh>
        <submesh material="Body" usesharedvertices="false">
            <faces count="2"><face v1="0" v2="1" v3="2"/><face v1="1" v2="3" v3="2"/></faces>
            <geometry vertexcount="4">{body_pos}{body_uv}</geometry>
        </submesh>
        <submesh usesharedvertices="false">
            <faces count="1"><face v1="2" v2="1" v3="0"/></faces>
            <geometry vertexcount="3">{tail_pos}{tail_uv}</geometry>
        </submesh>
    </submeshes>
</mesh>
"#,
        shared_pos = position_buffer(3, true),
        shared_uv = uv_buffer(3),
        body_pos = position_buffer(4, true),
        body_uv = uv_buffer(4),
        tail_pos = position_buffer(3, true),
        tail_uv = uv_buffer(3),
    )
}

/// Two local blocks; only the first carries normals
pub fn mixed_normals_xml() -> String {
    format!(
        r#"<mesh><submeshes>
    <submesh material="Lit"><faces><face v1="0" v2="1" v3="2"/></faces><geometry vertexcount="3">{}</geometry></submesh>
    <submesh material="Flat"><faces><face v1="0" v2="1" v3="2"/></faces><geometry vertexcount="3">{}</geometry></submesh>
</submeshes></mesh>"#,
        position_buffer(3, true),
        position_buffer(3, false),
    )
}

/// Single right triangle in the XY plane with placeholder normals
pub fn triangle_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<mesh>
    <submeshes>
        <submesh material="Tri" usesharedvertices="false">
            <faces count="1">
                <face v1="0" v2="1" v3="2" />
            </faces>
            <geometry vertexcount="3">
                <vertexbuffer positions="true" normals="true">
                    <vertex>
                        <position x="0" y="0" z="0" />
                        <normal x="1" y="0" z="0" />
                    </vertex>
                    <vertex>
                        <position x="1" y="0" z="0" />
                        <normal x="1" y="0" z="0" />
                    </vertex>
                    <vertex>
                        <position x="0" y="1" z="0" />
                        <normal x="1" y="0" z="0" />
                    </vertex>
                </vertexbuffer>
            </geometry>
        </submesh>
    </submeshes>
</mesh>
"#
    .to_string()
}

/// Truncated document that fails to parse
pub fn malformed_xml() -> String {
    r#"<mesh><submeshes><submesh material="Broken"><faces>"#.to_string()
}

/// Well-formed document declaring more vertices than can be indexed
pub fn oversized_xml() -> String {
    r#"<mesh>
    <sharedgeometry vertexcount="18446744073709551615"/>
    <submeshes><submesh material="Huge" usesharedvertices="true"/></submeshes>
</mesh>"#
        .to_string()
}

pub fn write(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, content)
}
