use tumble_engine::coords::{BB, Transform, Vec2};

/// Reference view the demos are laid out for, in world units.
pub const VIEW_WIDTH: f32 = 640.0;
pub const VIEW_HEIGHT: f32 = 480.0;

const PAN_STEP: f32 = 50.0;
const ZOOM_STEP: f32 = 1.2;

/// Projection for a framebuffer, fitting the reference view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Pixels per world unit.
    pub scale_factor: f32,
    pub projection: Transform,
}

impl Viewport {
    /// Fits the 640×480 view inside `width` × `height` pixels, centered.
    pub fn fit(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let scale = (w / VIEW_WIDTH).min(h / VIEW_HEIGHT);
        let hw = w * (0.5 / scale);
        let hh = h * (0.5 / scale);

        Self {
            width,
            height,
            scale_factor: scale,
            projection: Transform::ortho(BB::new(-hw, -hh, hw, hh)),
        }
    }
}

/// User pan/zoom on top of the fitted projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewControl {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewControl {
    fn default() -> Self {
        Self {
            translate: Vec2::zero(),
            scale: 1.0,
        }
    }
}

impl ViewControl {
    /// Handles the numeric-keypad view keys. Returns `false` for other keys.
    pub fn key(&mut self, ch: char) -> bool {
        let pan = PAN_STEP / self.scale;
        match ch {
            '5' => *self = Self::default(),
            '4' => self.translate.x += pan,
            '6' => self.translate.x -= pan,
            '2' => self.translate.y += pan,
            '8' => self.translate.y -= pan,
            '7' => self.scale /= ZOOM_STEP,
            '9' => self.scale *= ZOOM_STEP,
            _ => return false,
        }
        true
    }

    /// World-to-view transform.
    pub fn view(&self) -> Transform {
        Transform::scale(self.scale, self.scale).mult(Transform::translate(self.translate))
    }

    /// Camera placement handed to the renderer (inverse of [`view`](Self::view)).
    pub fn camera(&self) -> Transform {
        self.view().inverse()
    }

    /// Physical pixel position (origin top-left, +Y down) to world units.
    pub fn pixel_to_world(&self, viewport: &Viewport, x: f32, y: f32) -> Vec2 {
        let w = viewport.width.max(1) as f32;
        let h = viewport.height.max(1) as f32;
        let ndc = Vec2::new(2.0 * x / w - 1.0, 1.0 - 2.0 * y / h);
        let clip_to_world = self.camera().mult(viewport.projection.inverse());
        clip_to_world.point(ndc)
    }
}
