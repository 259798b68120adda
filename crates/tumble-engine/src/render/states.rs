//! Render states: WGSL modules, blend modes, uniform blocks and pipelines.
//!
//! Four states cover the whole debug renderer:
//!
//! | state         | shader             | blend                                   |
//! |---------------|--------------------|-----------------------------------------|
//! | `Primitive`   | `primitive.wgsl`   | premultiplied alpha                     |
//! | `Font`        | `font.wgsl`        | premultiplied alpha                     |
//! | `ShadowMask`  | `shadow_mask.wgsl` | color Zero/One, alpha One/One           |
//! | `ShadowApply` | `shadow_apply.wgsl`| color DstAlpha/OneMinusDstAlpha, alpha 0|

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

use super::batch::Vertex;

pub(crate) const PRIMITIVE_WGSL: &str = include_str!("shaders/primitive.wgsl");
pub(crate) const FONT_WGSL: &str = include_str!("shaders/font.wgsl");
pub(crate) const SHADOW_MASK_WGSL: &str = include_str!("shaders/shadow_mask.wgsl");
pub(crate) const SHADOW_APPLY_WGSL: &str = include_str!("shaders/shadow_apply.wgsl");

/// Render state a batch is drawn with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderStateId {
    Primitive,
    Font,
    ShadowMask,
    ShadowApply,
}

impl RenderStateId {
    pub const ALL: [RenderStateId; 4] = [
        RenderStateId::Primitive,
        RenderStateId::Font,
        RenderStateId::ShadowMask,
        RenderStateId::ShadowApply,
    ];

    pub fn blend(self) -> wgpu::BlendState {
        match self {
            RenderStateId::Primitive | RenderStateId::Font => premul_alpha_blend(),
            RenderStateId::ShadowMask => shadow_mask_blend(),
            RenderStateId::ShadowApply => shadow_apply_blend(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            RenderStateId::Primitive => "tumble primitive",
            RenderStateId::Font => "tumble font",
            RenderStateId::ShadowMask => "tumble shadow mask",
            RenderStateId::ShadowApply => "tumble shadow apply",
        }
    }

    fn source(self) -> &'static str {
        match self {
            RenderStateId::Primitive => PRIMITIVE_WGSL,
            RenderStateId::Font => FONT_WGSL,
            RenderStateId::ShadowMask => SHADOW_MASK_WGSL,
            RenderStateId::ShadowApply => SHADOW_APPLY_WGSL,
        }
    }
}

// ── blend ─────────────────────────────────────────────────────────────────

fn component(
    src_factor: wgpu::BlendFactor,
    dst_factor: wgpu::BlendFactor,
) -> wgpu::BlendComponent {
    wgpu::BlendComponent {
        src_factor,
        dst_factor,
        operation: wgpu::BlendOperation::Add,
    }
}

pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    use wgpu::BlendFactor::{One, OneMinusSrcAlpha};
    wgpu::BlendState {
        color: component(One, OneMinusSrcAlpha),
        alpha: component(One, OneMinusSrcAlpha),
    }
}

/// Leaves color untouched and sums occlusion into destination alpha.
pub(crate) fn shadow_mask_blend() -> wgpu::BlendState {
    use wgpu::BlendFactor::{One, Zero};
    wgpu::BlendState {
        color: component(Zero, One),
        alpha: component(One, One),
    }
}

/// Mixes the shadow tint in by destination alpha and resets alpha to 0.
pub(crate) fn shadow_apply_blend() -> wgpu::BlendState {
    use wgpu::BlendFactor::{DstAlpha, OneMinusDstAlpha, Zero};
    wgpu::BlendState {
        color: component(DstAlpha, OneMinusDstAlpha),
        alpha: component(Zero, Zero),
    }
}

// ── uniform blocks ────────────────────────────────────────────────────────

/// Globals shared by the primitive and font shaders (160 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Globals {
    /// Projection only, used for screen-anchored text.
    pub p: [[f32; 4]; 4],
    /// Projection times inverse camera.
    pub mvp: [[f32; 4]; 4],
    pub outline_color: [f32; 4],
    pub outline_width: f32,
    pub _pad: [f32; 3],
}

impl Globals {
    pub fn new(p: [[f32; 4]; 4], mvp: [[f32; 4]; 4], outline_color: Color, outline_width: f32) -> Self {
        Self {
            p,
            mvp,
            outline_color: outline_color.to_array(),
            outline_width,
            _pad: [0.0; 3],
        }
    }
}

/// Per-frame locals of the shadow mask shader (144 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ShadowLocals {
    pub light_matrix: [[f32; 4]; 4],
    pub mvp: [[f32; 4]; 4],
    pub radius: f32,
    pub _pad: [f32; 3],
}

impl ShadowLocals {
    pub fn new(light_matrix: [[f32; 4]; 4], mvp: [[f32; 4]; 4], radius: f32) -> Self {
        Self { light_matrix, mvp, radius, _pad: [0.0; 3] }
    }
}

fn min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── pipelines ─────────────────────────────────────────────────────────────

/// Bind group layouts and one render pipeline per [`RenderStateId`], all
/// built for a single surface format.
pub(crate) struct Pipelines {
    pub format: wgpu::TextureFormat,
    pub globals_layout: wgpu::BindGroupLayout,
    pub font_layout: wgpu::BindGroupLayout,
    pub shadow_layout: wgpu::BindGroupLayout,
    primitive: wgpu::RenderPipeline,
    font: wgpu::RenderPipeline,
    shadow_mask: wgpu::RenderPipeline,
    shadow_apply: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let globals_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: min_binding_size::<Globals>(),
            },
            count: None,
        };

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tumble globals bgl"),
            entries: &[globals_entry],
        });

        let font_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tumble font bgl"),
            entries: &[
                globals_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tumble shadow bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: min_binding_size::<ShadowLocals>(),
                },
                count: None,
            }],
        });

        let primitive = build_pipeline(device, format, RenderStateId::Primitive, &[&globals_layout]);
        let font = build_pipeline(device, format, RenderStateId::Font, &[&font_layout]);
        let shadow_mask =
            build_pipeline(device, format, RenderStateId::ShadowMask, &[&shadow_layout]);
        let shadow_apply = build_pipeline(device, format, RenderStateId::ShadowApply, &[]);

        Self {
            format,
            globals_layout,
            font_layout,
            shadow_layout,
            primitive,
            font,
            shadow_mask,
            shadow_apply,
        }
    }

    pub fn get(&self, state: RenderStateId) -> &wgpu::RenderPipeline {
        match state {
            RenderStateId::Primitive => &self.primitive,
            RenderStateId::Font => &self.font,
            RenderStateId::ShadowMask => &self.shadow_mask,
            RenderStateId::ShadowApply => &self.shadow_apply,
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    state: RenderStateId,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let label = state.label();

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(state.source().into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(state.blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(name: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name}: {}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name}: {e:?}"));
    }

    // ── shaders ───────────────────────────────────────────────────────────

    #[test]
    fn every_shader_parses_and_validates() {
        for state in RenderStateId::ALL {
            validate(state.label(), state.source());
        }
    }

    #[test]
    fn every_shader_has_both_entry_points() {
        for state in RenderStateId::ALL {
            let module = naga::front::wgsl::parse_str(state.source()).unwrap();
            let names: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
            assert!(names.contains(&"vs_main"), "{}", state.label());
            assert!(names.contains(&"fs_main"), "{}", state.label());
        }
    }

    // ── uniform layout ────────────────────────────────────────────────────

    #[test]
    fn uniform_blocks_match_shader_sizes() {
        assert_eq!(std::mem::size_of::<Globals>(), 160);
        assert_eq!(std::mem::size_of::<ShadowLocals>(), 144);
    }

    // ── blend ─────────────────────────────────────────────────────────────

    #[test]
    fn shadow_mask_only_accumulates_alpha() {
        let b = RenderStateId::ShadowMask.blend();
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(b.alpha.src_factor, wgpu::BlendFactor::One);
        assert_eq!(b.alpha.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn shadow_apply_clears_alpha() {
        let b = RenderStateId::ShadowApply.blend();
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::DstAlpha);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusDstAlpha);
        assert_eq!(b.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(b.alpha.dst_factor, wgpu::BlendFactor::Zero);
    }
}
