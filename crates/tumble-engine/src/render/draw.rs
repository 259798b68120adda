
use crate::coords::{Transform, Vec2, BB};
use crate::paint::Color;

use super::batch::{FrameBatch, Vertex};
use super::fence::SubmissionFence;
use super::font::{SdfAtlas, SdfGlyph};
use super::states::{Globals, Pipelines, RenderStateId, ShadowLocals};
use super::{RenderCtx, RenderTarget};

pub const TEXT_SCALE: f32 = 0.70;
pub const TEXT_LINE_HEIGHT: f32 = 18.0 * TEXT_SCALE;

/// Depth light reaches into an occluder, in world units.
pub const SHADOW_PENETRATION: f32 = 2.0;
pub const SHADOW_OPACITY: f32 = 1.0;

/// Background; alpha 0 so the shadow mask starts empty.
pub const CLEAR_COLOR: Color = Color::rgba(236.0 / 256.0, 115.0 / 256.0, 87.0 / 256.0, 0.0);
pub const SHADOW_COLOR: Color = Color::rgba(117.0 / 256.0, 79.0 / 256.0, 68.0 / 256.0, 1.0);

const DEFAULT_OUTLINE_COLOR: Color = Color::rgba(89.0 / 256.0, 50.0 / 256.0, 39.0 / 256.0, 1.0);
const DEFAULT_TEXT_COLOR: Color = Color::rgba(43.0 / 256.0, 27.0 / 256.0, 23.0 / 256.0, 1.0);

const QUAD_INDEXES: [u32; 6] = [0, 1, 2, 2, 3, 0];
const SEGMENT_INDEXES: [u32; 18] = [0, 1, 2, 3, 1, 2, 3, 4, 2, 3, 4, 5, 6, 4, 5, 6, 7, 5];

/// View and lighting parameters read by [`DebugRenderer::begin`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    /// Screen pixels per world unit.
    pub scale_factor: f32,
    pub projection: Transform,
    pub camera: Transform,
    pub light_position: Vec2,
    pub light_radius: f32,
    pub outline_color: Color,
    pub text_color: Color,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            projection: Transform::IDENTITY,
            camera: Transform::IDENTITY,
            light_position: Vec2::zero(),
            light_radius: 0.0,
            outline_color: DEFAULT_OUTLINE_COLOR,
            text_color: DEFAULT_TEXT_COLOR,
        }
    }
}

/// Immediate-mode debug renderer.
///
/// Usage per frame: [`begin`](Self::begin), any number of draw calls,
/// [`flush`](Self::flush). Draw calls only touch CPU memory; GPU resources are
/// created lazily on the first flush and rebuilt when the surface format
/// changes.
pub struct DebugRenderer {
    pub state: DrawState,

    frame: FrameBatch,
    globals: Globals,
    shadow_locals: ShadowLocals,
    light_inverse: Transform,
    target_size: (u32, u32),

    atlas: Option<SdfAtlas>,
    warned_no_font: bool,

    // previous submission still running on the GPU
    fence: SubmissionFence,
    device: Option<wgpu::Device>,

    // pipelines
    pipelines: Option<Pipelines>,

    // uniforms
    globals_ubo: Option<wgpu::Buffer>,
    shadow_ubo: Option<wgpu::Buffer>,
    globals_bind_group: Option<wgpu::BindGroup>,
    shadow_bind_group: Option<wgpu::BindGroup>,

    // font
    atlas_texture: Option<wgpu::Texture>,
    font_bind_group: Option<wgpu::BindGroup>,

    // geometry
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    index_buffer: Option<wgpu::Buffer>,
    index_capacity: usize,
}

impl Default for DebugRenderer {
    fn default() -> Self {
        Self {
            state: DrawState::default(),
            frame: FrameBatch::new(),
            globals: Globals::default(),
            shadow_locals: ShadowLocals::default(),
            light_inverse: Transform::IDENTITY,
            target_size: (1, 1),
            atlas: None,
            warned_no_font: false,
            fence: SubmissionFence::new(),
            device: None,
            pipelines: None,
            globals_ubo: None,
            shadow_ubo: None,
            globals_bind_group: None,
            shadow_bind_group: None,
            atlas_texture: None,
            font_bind_group: None,
            vertex_buffer: None,
            vertex_capacity: 0,
            index_buffer: None,
            index_capacity: 0,
        }
    }
}

impl DebugRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the glyph atlas used by [`text`](Self::text).
    pub fn set_font(&mut self, atlas: SdfAtlas) {
        self.atlas = Some(atlas);
        self.atlas_texture = None;
        self.font_bind_group = None;
    }

    pub fn frame(&self) -> &FrameBatch {
        &self.frame
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn shadow_locals(&self) -> &ShadowLocals {
        &self.shadow_locals
    }

    /// Starts a frame for a `width` × `height` pixel target.
    ///
    /// Waits for the previous frame's submission if it is still running,
    /// then snapshots [`state`](Self::state) into the uniform blocks; changes
    /// to the state after this call apply to the next frame.
    pub fn begin(&mut self, width: u32, height: u32) {
        if let Some(device) = &self.device {
            self.fence.wait(device);
        }

        self.target_size = (width.max(1), height.max(1));
        self.frame.clear();

        let s = &self.state;
        let p = s.projection;
        let mvp = p.mult(s.camera.inverse());
        self.globals = Globals::new(p.to_mat4(), mvp.to_mat4(), s.outline_color, s.scale_factor);

        let light = Transform::translate(s.light_position);
        let lmvp = mvp.mult(light);
        self.shadow_locals = ShadowLocals::new(light.to_mat4(), lmvp.to_mat4(), s.light_radius);
        self.light_inverse = light.inverse();
    }

    // ── primitives ────────────────────────────────────────────────────────

    fn draw_circle_raw(&mut self, p: Vec2, r1: f32, r2: f32, color: Color) {
        let uv2 = [r1, r2.max(1.0)];
        let c = color.to_array();

        let mut w = self.frame.enqueue_triangles(2, 4, RenderStateId::Primitive);
        w.push_vertex(Vertex::new([p.x - r2, p.y - r2, 0.0, 1.0], [-r2, -r2], uv2, c))
            .push_vertex(Vertex::new([p.x - r2, p.y + r2, 0.0, 1.0], [-r2, r2], uv2, c))
            .push_vertex(Vertex::new([p.x + r2, p.y + r2, 0.0, 1.0], [r2, r2], uv2, c))
            .push_vertex(Vertex::new([p.x + r2, p.y - r2, 0.0, 1.0], [r2, -r2], uv2, c))
            .push_indexes(&QUAD_INDEXES);
    }

    fn draw_segment_raw(&mut self, a: Vec2, b: Vec2, r1: f32, r2: f32, color: Color) {
        let t = (b - a).normalize() * r2;
        let uv2 = [r1, r2.max(1.0)];
        let c = color.to_array();
        let v = |x: f32, y: f32, u: f32, w: f32| Vertex::new([x, y, 0.0, 1.0], [u, w], uv2, c);

        let mut w = self.frame.enqueue_triangles(6, 8, RenderStateId::Primitive);
        w.push_vertex(v(b.x - t.y + t.x, b.y + t.x + t.y, r2, -r2))
            .push_vertex(v(b.x + t.y + t.x, b.y - t.x + t.y, r2, r2))
            .push_vertex(v(b.x - t.y, b.y + t.x, 0.0, -r2))
            .push_vertex(v(b.x + t.y, b.y - t.x, 0.0, r2))
            .push_vertex(v(a.x - t.y, a.y + t.x, 0.0, -r2))
            .push_vertex(v(a.x + t.y, a.y - t.x, 0.0, r2))
            .push_vertex(v(a.x - t.y - t.x, a.y + t.x - t.y, -r2, -r2))
            .push_vertex(v(a.x + t.y - t.x, a.y - t.x - t.y, -r2, r2))
            .push_indexes(&SEGMENT_INDEXES);
    }

    /// Filled dot of diameter `size`, without outline.
    pub fn dot(&mut self, size: f32, pos: Vec2, fill: Color) {
        let r = size * 0.5;
        self.draw_circle_raw(pos, r + 1.0, r, fill);
    }

    /// Outlined circle with a radial line marking `angle`.
    pub fn circle(&mut self, pos: Vec2, angle: f32, radius: f32, fill: Color) {
        let r = radius + 1.0 / self.state.scale_factor;
        self.draw_circle_raw(pos, r - 1.0, r, fill);

        let tip = pos + Vec2::for_angle(angle) * (radius - self.state.scale_factor * 0.5);
        let outline = self.state.outline_color;
        self.segment(pos, tip, outline);
    }

    /// Thin line.
    pub fn segment(&mut self, a: Vec2, b: Vec2, color: Color) {
        self.draw_segment_raw(a, b, 2.0, 1.0, color);
    }

    /// Outlined capsule of the given radius.
    pub fn fat_segment(&mut self, a: Vec2, b: Vec2, radius: f32, fill: Color) {
        let r = (radius + 1.0 / self.state.scale_factor).max(1.0);
        self.draw_segment_raw(a, b, r - 1.0, r, fill);
    }

    /// Convex polygon as a triangle fan; `radius` is accepted for rounded
    /// shapes but not rendered.
    pub fn polygon(&mut self, verts: &[Vec2], _radius: f32, fill: Color) {
        let n = verts.len();
        if n < 3 {
            return;
        }

        let c = fill.to_array();
        let mut w = self.frame.enqueue_triangles(n - 2, n, RenderStateId::Primitive);
        for v in verts {
            w.push_vertex(Vertex::new([v.x, v.y, 0.0, 1.0], [0.0, 0.0], [1.0, 1.0], c));
        }
        for i in 1..(n as u32 - 1) {
            w.push_indexes(&[0, i, i + 1]);
        }
    }

    pub fn bb(&mut self, bb: BB, color: Color) {
        let verts = [
            Vec2::new(bb.r, bb.b),
            Vec2::new(bb.r, bb.t),
            Vec2::new(bb.l, bb.t),
            Vec2::new(bb.l, bb.b),
        ];
        self.polygon(&verts, 0.0, color);
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Draws `text` with its first baseline at `pos` in projection units.
    ///
    /// `'\n'` starts a new line [`TEXT_LINE_HEIGHT`] below. Characters missing
    /// from the atlas are skipped.
    pub fn text(&mut self, pos: Vec2, text: &str, color: Color) {
        let Some(atlas) = self.atlas.as_ref() else {
            if !self.warned_no_font {
                log::warn!("no font loaded; text is not drawn");
                self.warned_no_font = true;
            }
            return;
        };

        let c = color.to_array();
        let (mut x, mut y) = (pos.x, pos.y);
        for ch in text.chars() {
            if ch == '\n' {
                y -= TEXT_LINE_HEIGHT;
                x = pos.x;
                continue;
            }
            let Some(glyph) = atlas.glyph(ch) else { continue };
            push_glyph(&mut self.frame, atlas, glyph, x, y, c);
            x += glyph.advance * TEXT_SCALE;
        }
    }

    // ── shadows ───────────────────────────────────────────────────────────

    /// Adds the shadow volume of a closed occluder outline.
    ///
    /// `verts` are in the body's local space and placed by `transform`.
    pub fn shadow(&mut self, transform: Transform, verts: &[Vec2]) {
        let n = verts.len();
        if n < 2 {
            return;
        }

        let t = self.light_inverse.mult(transform);
        let clear = Color::CLEAR.to_array();

        let mut w = self.frame.enqueue_triangles(2 * n, 4 * n, RenderStateId::ShadowMask);
        let mut a = t.point(verts[n - 1]);
        for (i, v) in verts.iter().enumerate() {
            let b = t.point(*v);
            for (ox, oy) in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)] {
                w.push_vertex(Vertex::new(
                    [ox, oy, SHADOW_PENETRATION, SHADOW_OPACITY],
                    [a.x, a.y],
                    [b.x, b.y],
                    clear,
                ));
            }
            w.push_indexes_at(4 * i as u32, &QUAD_INDEXES);
            a = b;
        }
    }

    /// Composites the accumulated shadow mask over the scene.
    pub fn apply_shadows(&mut self) {
        let c = SHADOW_COLOR.to_array();
        let mut w = self.frame.enqueue_triangles(2, 4, RenderStateId::ShadowApply);
        for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            w.push_vertex(Vertex::new([x, y, 0.0, 1.0], [0.0, 0.0], [0.0, 0.0], c));
        }
        w.push_indexes(&QUAD_INDEXES);
    }

    // ── flush ─────────────────────────────────────────────────────────────

    /// Uploads the frame and records one render pass that clears the target
    /// and replays every batch.
    pub fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.device.is_none() {
            self.device = Some(ctx.device.clone());
        }

        self.ensure_pipelines(ctx);
        self.ensure_uniforms(ctx);
        self.ensure_font(ctx);
        self.ensure_geometry_capacity(ctx);
        self.upload(ctx);

        let (width, height) = self.target_size;
        let clear = CLEAR_COLOR;

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tumble debug draw pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let resources = (
                self.pipelines.as_ref(),
                self.vertex_buffer.as_ref(),
                self.index_buffer.as_ref(),
            );
            if let (Some(pipelines), Some(vbo), Some(ibo)) = resources
                && !self.frame.is_empty()
            {
                rpass.set_viewport(
                    0.0,
                    0.0,
                    width.min(ctx.width.max(1)) as f32,
                    height.min(ctx.height.max(1)) as f32,
                    0.0,
                    1.0,
                );
                rpass.set_vertex_buffer(0, vbo.slice(..));
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

                for batch in self.frame.batches() {
                    let bind_group = match batch.state {
                        RenderStateId::Primitive => self.globals_bind_group.as_ref(),
                        RenderStateId::Font => self.font_bind_group.as_ref(),
                        RenderStateId::ShadowMask => self.shadow_bind_group.as_ref(),
                        RenderStateId::ShadowApply => None,
                    };
                    if batch.state != RenderStateId::ShadowApply && bind_group.is_none() {
                        continue;
                    }

                    rpass.set_pipeline(pipelines.get(batch.state));
                    if let Some(bg) = bind_group {
                        rpass.set_bind_group(0, bg, &[]);
                    }
                    let start = batch.index_start;
                    rpass.draw_indexed(start..start + batch.index_count, 0, 0..1);
                }
            }
        }
    }

    /// Fence [`begin`](Self::begin) waits on. Arm it after submitting the
    /// encoder that [`flush`](Self::flush) recorded into.
    pub fn fence(&self) -> &SubmissionFence {
        &self.fence
    }

    // ── lazy-init helpers ─────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipelines.as_ref().is_some_and(|p| p.format == ctx.surface_format) {
            return;
        }

        log::debug!("building debug draw pipelines for {:?}", ctx.surface_format);
        self.pipelines = Some(Pipelines::new(ctx.device, ctx.surface_format));
        self.globals_bind_group = None;
        self.shadow_bind_group = None;
        self.font_bind_group = None;
    }

    fn ensure_uniforms(&mut self, ctx: &RenderCtx<'_>) {
        let Some(pipelines) = self.pipelines.as_ref() else { return };

        let globals_ubo = self.globals_ubo.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tumble globals ubo"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        if self.globals_bind_group.is_none() {
            self.globals_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tumble globals bind group"),
                layout: &pipelines.globals_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_ubo.as_entire_binding(),
                }],
            }));
        }

        let shadow_ubo = self.shadow_ubo.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tumble shadow ubo"),
                size: std::mem::size_of::<ShadowLocals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        if self.shadow_bind_group.is_none() {
            self.shadow_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tumble shadow bind group"),
                layout: &pipelines.shadow_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shadow_ubo.as_entire_binding(),
                }],
            }));
        }
    }

    fn ensure_font(&mut self, ctx: &RenderCtx<'_>) {
        if self.font_bind_group.is_some() {
            return;
        }
        let (Some(atlas), Some(pipelines), Some(globals_ubo)) =
            (self.atlas.as_ref(), self.pipelines.as_ref(), self.globals_ubo.as_ref())
        else {
            return;
        };

        let size = wgpu::Extent3d {
            width: atlas.width(),
            height: atlas.height(),
            depth_or_array_layers: 1,
        };

        let texture = match self.atlas_texture.take() {
            Some(t) => t,
            None => {
                let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("tumble sdf atlas"),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::R8Unorm,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                });
                ctx.queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    atlas.pixels(),
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(atlas.width()),
                        rows_per_image: Some(atlas.height()),
                    },
                    size,
                );
                texture
            }
        };

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tumble sdf sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        self.font_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tumble font bind group"),
            layout: &pipelines.font_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        }));
        self.atlas_texture = Some(texture);
    }

    fn ensure_geometry_capacity(&mut self, ctx: &RenderCtx<'_>) {
        let vertices = self.frame.vertices().len();
        if vertices > self.vertex_capacity || self.vertex_buffer.is_none() {
            let cap = vertices.next_power_of_two().max(1024);
            self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tumble vertex buffer"),
                size: (cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
        }

        let indexes = self.frame.indexes().len();
        if indexes > self.index_capacity || self.index_buffer.is_none() {
            let cap = indexes.next_power_of_two().max(2048);
            self.index_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tumble index buffer"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
        }
    }

    fn upload(&self, ctx: &RenderCtx<'_>) {
        if let Some(ubo) = self.globals_ubo.as_ref() {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&self.globals));
        }
        if let Some(ubo) = self.shadow_ubo.as_ref() {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&self.shadow_locals));
        }
        if self.frame.is_empty() {
            return;
        }
        if let Some(vbo) = self.vertex_buffer.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(self.frame.vertices()));
        }
        if let Some(ibo) = self.index_buffer.as_ref() {
            ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(self.frame.indexes()));
        }
    }
}

/// Emits the quad of one glyph with its pen position at `(x, y)`.
fn push_glyph(
    frame: &mut FrameBatch,
    atlas: &SdfAtlas,
    glyph: &SdfGlyph,
    x: f32,
    y: f32,
    color: [f32; 4],
) {
    if glyph.is_empty() {
        return;
    }

    let [u0, v0, u1, v1] = atlas.uv_rect(glyph);
    let xmin = x + glyph.x_offset * TEXT_SCALE;
    let ymax = y + glyph.y_offset * TEXT_SCALE;
    let xmax = xmin + glyph.width as f32 * TEXT_SCALE;
    let ymin = ymax - glyph.height as f32 * TEXT_SCALE;

    let mut w = frame.enqueue_triangles(2, 4, RenderStateId::Font);
    w.push_vertex(Vertex::new([xmin, ymin, 0.0, 1.0], [u0, v1], [0.0, 0.0], color))
        .push_vertex(Vertex::new([xmin, ymax, 0.0, 1.0], [u0, v0], [0.0, 0.0], color))
        .push_vertex(Vertex::new([xmax, ymax, 0.0, 1.0], [u1, v0], [0.0, 0.0], color))
        .push_vertex(Vertex::new([xmax, ymin, 0.0, 1.0], [u1, v1], [0.0, 0.0], color))
        .push_indexes(&QUAD_INDEXES);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn renderer() -> DebugRenderer {
        let mut r = DebugRenderer::new();
        r.begin(640, 480);
        r
    }

    fn counts(r: &DebugRenderer) -> (usize, usize) {
        (r.frame().vertices().len(), r.frame().indexes().len())
    }

    // ── frame fence ───────────────────────────────────────────────────────

    #[test]
    fn begin_without_a_device_never_blocks() {
        let mut r = DebugRenderer::new();
        assert!(!r.fence().is_pending());
        r.begin(640, 480);
        r.begin(800, 600);
        assert!(!r.fence().is_pending());
    }

    #[test]
    fn fence_handle_is_shared_with_the_renderer() {
        let r = DebugRenderer::new();
        let handle = r.fence().clone();
        assert_eq!(handle.is_pending(), r.fence().is_pending());
    }

    // ── primitive counts ──────────────────────────────────────────────────

    #[test]
    fn dot_and_circle_quad_counts() {
        let mut r = renderer();
        r.dot(4.0, Vec2::zero(), Color::la(1.0, 1.0));
        assert_eq!(counts(&r), (4, 6));

        let mut r = renderer();
        r.circle(Vec2::zero(), 0.0, 10.0, Color::la(1.0, 1.0));
        // Circle quad plus the angle marker segment.
        assert_eq!(counts(&r), (4 + 8, 6 + 18));
    }

    #[test]
    fn segment_counts() {
        let mut r = renderer();
        r.segment(Vec2::zero(), Vec2::new(10.0, 0.0), Color::la(0.0, 1.0));
        assert_eq!(counts(&r), (8, 18));
        r.fat_segment(Vec2::zero(), Vec2::new(0.0, 10.0), 3.0, Color::la(0.0, 1.0));
        assert_eq!(counts(&r), (16, 36));
    }

    #[test]
    fn polygon_fan_counts() {
        for n in 3..9 {
            let mut r = renderer();
            let verts: Vec<_> = (0..n)
                .map(|i| Vec2::for_angle(i as f32 * std::f32::consts::TAU / n as f32))
                .collect();
            r.polygon(&verts, 0.0, Color::la(1.0, 1.0));
            assert_eq!(counts(&r), (n, 3 * (n - 2)));
            assert_eq!(&r.frame().indexes()[..3], &[0, 1, 2]);
        }
    }

    #[test]
    fn degenerate_polygon_draws_nothing() {
        let mut r = renderer();
        r.polygon(&[Vec2::zero(), Vec2::new(1.0, 0.0)], 0.0, Color::la(1.0, 1.0));
        assert!(r.frame().is_empty());
    }

    #[test]
    fn bb_corner_order() {
        let mut r = renderer();
        r.bb(BB::new(-1.0, -2.0, 3.0, 4.0), Color::la(1.0, 1.0));
        let pos: Vec<_> = r.frame().vertices().iter().map(|v| (v.position[0], v.position[1])).collect();
        assert_eq!(pos, [(3.0, -2.0), (3.0, 4.0), (-1.0, 4.0), (-1.0, -2.0)]);
    }

    // ── primitive attributes ──────────────────────────────────────────────

    #[test]
    fn dot_radii_are_packed_in_uv2() {
        let mut r = renderer();
        r.dot(6.0, Vec2::new(5.0, 5.0), Color::la(1.0, 1.0));
        let v = r.frame().vertices()[0];
        assert_eq!(v.uv2, [4.0, 3.0]);
        assert_eq!(v.uv1, [-3.0, -3.0]);
        assert_eq!(&v.position[..2], &[2.0, 2.0]);
    }

    #[test]
    fn small_radius_mask_is_at_least_one() {
        let mut r = renderer();
        r.dot(0.5, Vec2::zero(), Color::la(1.0, 1.0));
        assert_eq!(r.frame().vertices()[0].uv2[1], 1.0);
    }

    #[test]
    fn circle_marker_uses_outline_color() {
        let mut r = renderer();
        r.state.outline_color = Color::rgba(0.1, 0.2, 0.3, 1.0);
        r.circle(Vec2::zero(), 0.0, 10.0, Color::la(1.0, 1.0));
        assert_eq!(r.frame().vertices()[4].color, [0.1, 0.2, 0.3, 1.0]);
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn text_without_font_is_a_no_op() {
        let mut r = renderer();
        r.text(Vec2::zero(), "hello", Color::la(0.0, 1.0));
        assert!(r.frame().is_empty());
    }

    #[test]
    fn text_emits_one_quad_per_drawable_char() {
        let Ok(atlas) = SdfAtlas::find_system_font(None) else { return };
        let mut r = renderer();
        r.set_font(atlas);
        r.begin(640, 480);
        r.text(Vec2::zero(), "ab c\nd\u{e9}", Color::la(0.0, 1.0));
        // Space and the non-ASCII char emit nothing.
        assert_eq!(counts(&r), (4 * 4, 6 * 4));
        assert_eq!(r.frame().batches()[0].state, RenderStateId::Font);
    }

    // ── shadows ───────────────────────────────────────────────────────────

    #[test]
    fn shadow_emits_one_quad_per_edge() {
        let mut r = renderer();
        let square = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        r.shadow(Transform::IDENTITY, &square);
        assert_eq!(counts(&r), (16, 24));
        assert_eq!(r.frame().batches()[0].state, RenderStateId::ShadowMask);
        assert_eq!(&r.frame().indexes()[6..12], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn shadow_edges_are_in_light_space() {
        let mut r = DebugRenderer::new();
        r.state.light_position = Vec2::new(10.0, 0.0);
        r.begin(640, 480);
        r.shadow(
            Transform::translate(Vec2::new(20.0, 0.0)),
            &[Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)],
        );
        let v = r.frame().vertices()[0];
        // First edge runs from the last vertex to the first.
        assert_eq!(v.uv1, [10.0, 1.0]);
        assert_eq!(v.uv2, [10.0, -1.0]);
        assert_eq!(v.position, [0.0, 0.0, SHADOW_PENETRATION, SHADOW_OPACITY]);
    }

    #[test]
    fn apply_shadows_covers_clip_space() {
        let mut r = renderer();
        r.apply_shadows();
        assert_eq!(counts(&r), (4, 6));
        let v = r.frame().vertices()[2];
        assert_eq!(v.position, [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(v.color, SHADOW_COLOR.to_array());
    }

    // ── begin ─────────────────────────────────────────────────────────────

    #[test]
    fn begin_combines_projection_and_inverse_camera() {
        let mut r = DebugRenderer::new();
        r.state.projection = Transform::scale(0.5, 0.5);
        r.state.camera = Transform::translate(Vec2::new(10.0, 0.0));
        r.state.scale_factor = 2.0;
        r.begin(640, 480);

        let g = r.globals();
        assert_eq!(g.p[0][0], 0.5);
        assert_relative_eq!(g.mvp[3][0], -5.0);
        assert_eq!(g.outline_width, 2.0);
    }

    #[test]
    fn begin_clears_previous_frame() {
        let mut r = renderer();
        r.dot(1.0, Vec2::zero(), Color::la(1.0, 1.0));
        r.begin(640, 480);
        assert!(r.frame().is_empty());
    }

    #[test]
    fn begin_sets_up_light_locals() {
        let mut r = DebugRenderer::new();
        r.state.light_position = Vec2::new(-1000.0, 1000.0);
        r.state.light_radius = 50.0;
        r.begin(640, 480);

        let l = r.shadow_locals();
        assert_eq!(l.light_matrix[3][0], -1000.0);
        assert_eq!(l.light_matrix[3][1], 1000.0);
        assert_eq!(l.radius, 50.0);
    }
}
