//! WGSL sources, included at compile time

pub const TRIANGLE_VERT: &str = include_str!("../../shaders/wgsl/triangle.vert.wgsl");
pub const RED_FRAG: &str = include_str!("../../shaders/wgsl/red.frag.wgsl");
pub const POSITION_VERT: &str = include_str!("../../shaders/wgsl/position.vert.wgsl");
pub const COLOR_FRAG: &str = include_str!("../../shaders/wgsl/color.frag.wgsl");
pub const BASIC_VERT: &str = include_str!("../../shaders/wgsl/basic.vert.wgsl");
pub const BASIC_INSTANCED_VERT: &str =
    include_str!("../../shaders/wgsl/basic.instanced.vert.wgsl");
pub const POSITION_FRAG: &str = include_str!("../../shaders/wgsl/position.frag.wgsl");
pub const TEXTURED_FRAG: &str = include_str!("../../shaders/wgsl/textured.frag.wgsl");
pub const NORMAL_VERT: &str = include_str!("../../shaders/wgsl/normal.vert.wgsl");
pub const LAMBERT_FRAG: &str = include_str!("../../shaders/wgsl/lambert.frag.wgsl");
pub const SHADOW_VERTEX: &str = include_str!("../../shaders/wgsl/shadow.vertex.wgsl");
pub const SHADOW_FRAG: &str = include_str!("../../shaders/wgsl/shadow.frag.wgsl");
pub const SHADOW_DEPTH: &str = include_str!("../../shaders/wgsl/shadow.depth.wgsl");
pub const PARTICLE_VERT: &str = include_str!("../../shaders/wgsl/particle.vert.wgsl");
pub const COMPUTE_POSITION: &str = include_str!("../../shaders/wgsl/compute.position.wgsl");
pub const COMPUTE_TRANSFORM: &str = include_str!("../../shaders/wgsl/compute.transform.wgsl");

/// `compute.transform.wgsl` with its workgroup size filled in
pub fn compute_transform(workgroup_size: u32) -> String {
    COMPUTE_TRANSFORM.replace("WORKGROUP_SIZE", &workgroup_size.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(label: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{} does not parse:\n{}", label, e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{} does not validate: {:?}", label, e));
    }

    #[test]
    fn workgroup_size_is_substituted() {
        let source = compute_transform(256);
        assert!(source.contains("@workgroup_size(256)"));
        assert!(!source.contains("WORKGROUP_SIZE"));
    }

    #[test]
    fn every_shader_validates() {
        let sources = [
            ("triangle.vert", TRIANGLE_VERT),
            ("red.frag", RED_FRAG),
            ("position.vert", POSITION_VERT),
            ("color.frag", COLOR_FRAG),
            ("basic.vert", BASIC_VERT),
            ("basic.instanced.vert", BASIC_INSTANCED_VERT),
            ("position.frag", POSITION_FRAG),
            ("textured.frag", TEXTURED_FRAG),
            ("normal.vert", NORMAL_VERT),
            ("lambert.frag", LAMBERT_FRAG),
            ("shadow.vertex", SHADOW_VERTEX),
            ("shadow.frag", SHADOW_FRAG),
            ("shadow.depth", SHADOW_DEPTH),
            ("particle.vert", PARTICLE_VERT),
            ("compute.position", COMPUTE_POSITION),
        ];
        for (label, source) in sources {
            validate(label, source);
        }
    }

    #[test]
    fn transform_kernel_validates_at_every_offered_size() {
        for size in crate::config::WORKGROUP_SIZES {
            validate("compute.transform", &compute_transform(size));
        }
    }

    #[test]
    fn shadow_and_particle_constants_survive_in_source() {
        assert!(SHADOW_FRAG.contains("0.005"));
        assert!(COMPUTE_POSITION.contains("index >= u32(input[0])"));
    }
}
