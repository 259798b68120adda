//! Debug-draw renderer.
//!
//! Draw calls append geometry to a CPU [`FrameBatch`]; `flush` uploads it and
//! records a single render pass that replays the batches with their render
//! states.
//!
//! Convention:
//! - geometry is in world units (+Y up) and goes through `projection * inverse(camera)`
//! - text is in projection units and ignores the camera
//! - shadow geometry is in light space

mod batch;
mod ctx;
mod draw;
mod fence;
mod font;
mod states;

pub use batch::{Batch, BatchWriter, FrameBatch, Vertex};
pub use ctx::{RenderCtx, RenderTarget};
pub use draw::{
    DebugRenderer, DrawState, CLEAR_COLOR, SHADOW_COLOR, SHADOW_OPACITY, SHADOW_PENETRATION,
    TEXT_LINE_HEIGHT, TEXT_SCALE,
};
pub use fence::SubmissionFence;
pub use font::{SdfAtlas, SdfGlyph, GLYPH_PX, SDF_SPREAD, SYSTEM_FONT_PATHS};
pub use states::{Globals, RenderStateId, ShadowLocals};
