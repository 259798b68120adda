//! Demo harness.
//!
//! Owns the running scene, the fixed-timestep loop, the mouse grab joint,
//! the view controls and the HUD. Implements [`App`] so the engine runtime
//! drives it one frame at a time.

mod draw;
mod hud;
mod trial;
mod view;

pub use draw::{color_for_shape, default_draw, default_draw_options, draw_shadows, RendererCallbacks};
pub use hud::{InfoCounters, MessageBuffer, MESSAGE_CAPACITY};
pub use trial::time_trial;
pub use view::{ViewControl, Viewport};

use rand::rngs::StdRng;
use rand::SeedableRng;

use tumble_engine::coords::Vec2;
use tumble_engine::core::{App, AppControl, FrameCtx};
use tumble_engine::input::{InputFrame, InputState, Key, MouseButton};
use tumble_engine::render::{DebugRenderer, SdfAtlas};
use tumble_engine::time::FixedStepper;

use crate::demos::{demo_letter, BasicScene, DemoCtx, DemoEntry, Scene};
use crate::space::{ImpulseJointHandle, RigidBodyHandle, Space, GRAB_FILTER};

/// Seed applied before every scene is built.
pub const DEMO_SEED: u64 = 45073;

/// Extra reach given to mouse clicks so small shapes are easy to hit.
pub const GRAB_RADIUS: f32 = 5.0;

const LIGHT_POSITION: Vec2 = Vec2::new(-1000.0, 1000.0);
const LIGHT_RADIUS: f32 = 50.0;

/// Share of the remaining distance the mouse body covers per tick.
const MOUSE_FOLLOW: f32 = 0.25;

pub fn demo_title(index: usize, entry: &DemoEntry) -> String {
    format!("Demo({}): {}", demo_letter(index), entry.name)
}

pub struct Harness {
    demos: Vec<DemoEntry>,
    demo_index: usize,
    scene: Box<dyn Scene>,

    mouse_body: RigidBodyHandle,
    mouse_joint: Option<ImpulseJointHandle>,

    stepper: FixedStepper,
    last_time: Option<f64>,
    ticks: u64,
    time: f64,
    paused: bool,
    step: bool,

    mouse: Vec2,
    right_click: bool,
    right_down: bool,
    keyboard: Vec2,

    view: ViewControl,
    viewport: Viewport,

    rng: StdRng,
    messages: MessageBuffer,
    counters: InfoCounters,
    renderer: DebugRenderer,
    pending_title: Option<String>,
}

impl Harness {
    /// Starts demo `start` of `demos`. `demos` must not be empty.
    pub fn new(demos: Vec<DemoEntry>, start: usize, font: Option<SdfAtlas>) -> Self {
        debug_assert!(!demos.is_empty(), "demo table is empty");
        let start = start.min(demos.len().saturating_sub(1));
        let entry = demos[start];

        let mut renderer = DebugRenderer::new();
        if let Some(atlas) = font {
            renderer.set_font(atlas);
        }

        // Replaced by `run_demo` below.
        let placeholder = Space::new();
        let mouse_body = placeholder.static_body();

        let mut harness = Self {
            demos,
            demo_index: start,
            scene: Box::new(BasicScene(placeholder)),
            mouse_body,
            mouse_joint: None,
            stepper: FixedStepper::new(entry.timestep),
            last_time: None,
            ticks: 0,
            time: 0.0,
            paused: false,
            step: false,
            mouse: Vec2::zero(),
            right_click: false,
            right_down: false,
            keyboard: Vec2::zero(),
            view: ViewControl::default(),
            viewport: Viewport::fit(1, 1),
            rng: StdRng::seed_from_u64(DEMO_SEED),
            messages: MessageBuffer::default(),
            counters: InfoCounters::default(),
            renderer,
            pending_title: None,
        };
        harness.run_demo(start);
        harness
    }

    pub fn demo_index(&self) -> usize {
        self.demo_index
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn keyboard(&self) -> Vec2 {
        self.keyboard
    }

    pub fn mouse(&self) -> Vec2 {
        self.mouse
    }

    pub fn view(&self) -> &ViewControl {
        &self.view
    }

    pub fn is_grabbing(&self) -> bool {
        self.mouse_joint.is_some()
    }

    pub fn messages(&self) -> &str {
        self.messages.as_str()
    }

    pub fn renderer(&self) -> &DebugRenderer {
        &self.renderer
    }

    /// Title set on the window at the next frame.
    pub fn pending_title(&self) -> Option<&str> {
        self.pending_title.as_deref()
    }

    // ── demo switching ────────────────────────────────────────────────────

    /// Replaces the running scene with a fresh instance of demo `index`.
    pub fn run_demo(&mut self, index: usize) {
        let Some(entry) = self.demos.get(index).copied() else { return };

        self.rng = StdRng::seed_from_u64(DEMO_SEED);
        self.demo_index = index;

        self.ticks = 0;
        self.time = 0.0;
        self.stepper.reset(entry.timestep);
        self.last_time = None;

        self.renderer.state.light_position = LIGHT_POSITION;
        self.renderer.state.light_radius = LIGHT_RADIUS;

        self.mouse_joint = None;
        self.messages = MessageBuffer::default();
        self.counters = InfoCounters::default();

        // The previous scene, its space and the mouse body drop here.
        self.scene = (entry.init)(&mut self.rng);
        let space = self.scene.space_mut();
        self.mouse_body = space.add_kinematic_target(self.mouse);
        space.update_query_index();

        let title = demo_title(index, &entry);
        log::info!("{title}");
        self.pending_title = Some(title);
    }

    // ── simulation ────────────────────────────────────────────────────────

    /// One fixed step, skipped while paused unless a single step is queued.
    pub fn tick(&mut self, dt: f64) {
        if self.paused && !self.step {
            return;
        }
        self.messages.reset();

        let space = self.scene.space_mut();
        let current = space.body_position(self.mouse_body).unwrap_or(self.mouse);
        space.set_kinematic_target(self.mouse_body, current.lerp(self.mouse, MOUSE_FOLLOW));

        let mut ctx = DemoCtx {
            mouse: self.mouse,
            keyboard: self.keyboard,
            right_click: self.right_click,
            right_down: self.right_down,
            ticks: self.ticks,
            time: self.time,
            rng: &mut self.rng,
            messages: &mut self.messages,
        };
        self.scene.update(&mut ctx, dt);

        self.ticks += 1;
        self.time += dt;
        self.step = false;
        self.right_down = false;
    }

    /// Runs every whole tick owed since the previous call. `now` is in
    /// seconds on any monotonic clock.
    pub fn update(&mut self, now: f64) {
        let dt = self.last_time.map_or(0.0, |last| now - last);
        self.last_time = Some(now);

        let ticks = self.stepper.advance(dt, |_| {});
        let timestep = self.stepper.timestep();
        for _ in 0..ticks {
            self.tick(timestep);
        }
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Character commands: demo letters, restart, pause, single step and
    /// the view keys.
    pub fn keyboard_char(&mut self, ch: char) {
        let index = (ch as u32).wrapping_sub('a' as u32) as usize;

        if ch.is_ascii_lowercase() && index < self.demos.len() {
            self.run_demo(index);
        } else if ch == ' ' || ch == '\r' {
            self.run_demo(self.demo_index);
        } else if ch == '`' {
            self.paused = !self.paused;
        } else if ch == '1' {
            self.step = true;
        }

        self.view.key(ch);
    }

    /// Arrow keys accumulate into the keyboard direction.
    pub fn arrow_key(&mut self, key: Key, pressed: bool) {
        let d = if pressed { 1.0 } else { -1.0 };
        match key {
            Key::ArrowUp => self.keyboard.y += d,
            Key::ArrowDown => self.keyboard.y -= d,
            Key::ArrowRight => self.keyboard.x += d,
            Key::ArrowLeft => self.keyboard.x -= d,
            _ => {}
        }
    }

    /// Pointer position in physical pixels.
    pub fn mouse_moved(&mut self, x: f32, y: f32) {
        self.mouse = self.view.pixel_to_world(&self.viewport, x, y);
    }

    /// Left press grabs the nearest grabbable dynamic shape; release drops it.
    pub fn left_button(&mut self, pressed: bool) {
        let space = self.scene.space_mut();

        if !pressed {
            if let Some(joint) = self.mouse_joint.take() {
                space.remove_joint(joint);
            }
            return;
        }

        let Some(info) = space.point_query_nearest(self.mouse, GRAB_RADIUS, GRAB_FILTER) else { return };
        let Some(body) = info.body else { return };
        if !space.body_mass(body).is_finite() {
            return;
        }

        // Outside the shape, grab the closest surface point instead.
        let nearest = if info.distance > 0.0 { info.point } else { self.mouse };
        let Some(anchor) = space.world_to_local(body, nearest) else { return };

        if let Some(old) = self.mouse_joint.take() {
            space.remove_joint(old);
        }
        self.mouse_joint = Some(space.add_pivot(self.mouse_body, body, Vec2::zero(), anchor));
    }

    pub fn right_button(&mut self, pressed: bool) {
        self.right_click = pressed;
        self.right_down = pressed;
    }

    /// Applies one frame of collected input.
    pub fn handle_input(&mut self, input: &InputState, frame: &InputFrame) {
        for ch in frame.chars() {
            self.keyboard_char(ch);
        }

        for key in [Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft, Key::ArrowRight] {
            if frame.keys_pressed.contains(&key) {
                self.arrow_key(key, true);
            }
            if frame.keys_released.contains(&key) {
                self.arrow_key(key, false);
            }
        }

        if let Some((x, y)) = input.pointer_pos {
            self.mouse_moved(x, y);
        }

        if frame.buttons_pressed.contains(&MouseButton::Left) {
            self.left_button(true);
        }
        if frame.buttons_released.contains(&MouseButton::Left) {
            self.left_button(false);
        }
        if frame.buttons_pressed.contains(&MouseButton::Right) {
            self.right_button(true);
        }
        if frame.buttons_released.contains(&MouseButton::Right) {
            self.right_button(false);
        }
    }

    // ── display ───────────────────────────────────────────────────────────

    /// Fits the projection to a framebuffer of `width` × `height` pixels.
    pub fn reshape(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::fit(width, height);
        self.renderer.state.scale_factor = self.viewport.scale_factor;
        self.renderer.state.projection = self.viewport.projection;
    }

    /// Builds the frame: simulation catch-up, shadows, the scene and the HUD.
    /// The caller flushes the renderer.
    pub fn display(&mut self, width: u32, height: u32, now: f64) {
        if (width, height) != (self.viewport.width, self.viewport.height) {
            self.reshape(width, height);
        }
        self.renderer.state.camera = self.view.camera();
        self.renderer.begin(width, height);

        self.update(now);

        let space = self.scene.space();
        draw_shadows(space, &mut self.renderer);
        self.renderer.apply_shadows();

        self.scene.draw(&mut self.renderer);

        let text_color = self.renderer.state.text_color;
        self.renderer.text(hud::INSTRUCTIONS_POS, hud::INSTRUCTIONS, text_color);

        let info = self.counters.info_text(&self.scene.space().stats(), self.time);
        self.renderer.text(hud::INFO_POS, &info, text_color);

        if !self.messages.as_str().is_empty() {
            self.renderer.text(hud::MESSAGE_POS, self.messages.as_str(), text_color);
        }
    }
}

impl App for Harness {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.keys_pressed.contains(&Key::Escape) {
            return AppControl::Exit;
        }

        if let Some(title) = self.pending_title.take() {
            ctx.window.set_title(&title);
        }

        let (width, height) = ctx.window.framebuffer_size();
        if (width, height) != (self.viewport.width, self.viewport.height) {
            self.reshape(width, height);
        }

        self.handle_input(ctx.input, ctx.input_frame);
        self.display(width, height, ctx.time.elapsed);

        let fence = self.renderer.fence().clone();
        let renderer = &mut self.renderer;
        ctx.render(|rctx, target| renderer.flush(rctx, target), |rctx| fence.arm(rctx.queue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::{bench_list, demo_list};
    use crate::space::{BodyKind, ShapeProps};
    use approx::assert_relative_eq;

    fn box_scene(_: &mut StdRng) -> Box<dyn Scene> {
        let mut space = Space::new();
        let body = space.add_dynamic(Vec2::zero(), 0.0);
        space.add_box(body, 40.0, 40.0, 0.0, ShapeProps::default().with_mass(1.0));
        Box::new(BasicScene(space))
    }

    fn test_table() -> Vec<DemoEntry> {
        vec![
            DemoEntry { name: "One", timestep: 1.0 / 60.0, init: box_scene },
            DemoEntry { name: "Two", timestep: 1.0 / 120.0, init: box_scene },
        ]
    }

    fn harness() -> Harness {
        let mut h = Harness::new(test_table(), 0, None);
        h.reshape(640, 480);
        h
    }

    // ── run demo ──────────────────────────────────────────────────────────

    #[test]
    fn run_demo_resets_clock_and_sets_title() {
        let mut h = harness();
        h.update(0.0);
        h.update(0.1);
        assert!(h.ticks() > 0);

        h.keyboard_char('b');
        assert_eq!(h.demo_index(), 1);
        assert_eq!(h.ticks(), 0);
        assert_eq!(h.time(), 0.0);
        assert_eq!(h.pending_title(), Some("Demo(b): Two"));
        assert_eq!(h.renderer().state.light_position, LIGHT_POSITION);
        assert_eq!(h.renderer().state.light_radius, LIGHT_RADIUS);
    }

    #[test]
    fn out_of_range_letter_is_ignored() {
        let mut h = harness();
        h.keyboard_char('z');
        assert_eq!(h.demo_index(), 0);
    }

    #[test]
    fn space_restarts_current_demo() {
        let mut h = harness();
        h.update(0.0);
        h.update(0.05);
        h.keyboard_char(' ');
        assert_eq!(h.demo_index(), 0);
        assert_eq!(h.ticks(), 0);
    }

    #[test]
    fn demo_titles_use_letters() {
        let demos = demo_list();
        assert_eq!(demo_title(0, &demos[0]), "Demo(a): Pyramid Stack");
        let bench = bench_list();
        assert_eq!(demo_title(2, &bench[2]), "Demo(c): Compound Pile");
    }

    // ── timing ────────────────────────────────────────────────────────────

    #[test]
    fn update_runs_whole_ticks_and_clamps_stalls() {
        let mut h = harness();
        h.update(10.0);
        assert_eq!(h.ticks(), 0);
        h.update(10.11);
        assert_eq!(h.ticks(), 6);
        assert_relative_eq!(h.time(), 6.0 / 60.0, epsilon = 1e-9);

        // A five second stall counts as 0.2s: at most 13 more ticks.
        h.update(15.11);
        assert!(h.ticks() > 6);
        assert!(h.ticks() <= 6 + 13);
    }

    #[test]
    fn pause_blocks_ticks_until_single_step() {
        let mut h = harness();
        h.keyboard_char('`');
        assert!(h.is_paused());
        h.tick(1.0 / 60.0);
        assert_eq!(h.ticks(), 0);

        h.keyboard_char('1');
        h.tick(1.0 / 60.0);
        h.tick(1.0 / 60.0);
        assert_eq!(h.ticks(), 1);
    }

    // ── keyboard ──────────────────────────────────────────────────────────

    #[test]
    fn arrow_keys_accumulate_and_cancel() {
        let mut h = harness();
        h.arrow_key(Key::ArrowUp, true);
        h.arrow_key(Key::ArrowLeft, true);
        assert_eq!(h.keyboard(), Vec2::new(-1.0, 1.0));
        h.arrow_key(Key::ArrowUp, false);
        h.arrow_key(Key::ArrowLeft, false);
        assert_eq!(h.keyboard(), Vec2::zero());
    }

    #[test]
    fn view_keys_reach_the_view() {
        let mut h = harness();
        h.keyboard_char('9');
        assert_relative_eq!(h.view().scale, 1.2);
        h.keyboard_char('5');
        assert_eq!(*h.view(), ViewControl::default());
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn click_on_body_grabs_and_release_drops() {
        let mut h = harness();
        h.tick(1.0 / 60.0);

        // Window center is the world origin, inside the box.
        h.mouse_moved(320.0, 240.0);
        h.left_button(true);
        assert!(h.is_grabbing());
        assert_eq!(h.scene().space().joint_count(), 1);

        h.left_button(false);
        assert!(!h.is_grabbing());
        assert_eq!(h.scene().space().joint_count(), 0);
    }

    #[test]
    fn click_before_first_step_still_grabs() {
        let mut h = harness();
        assert_eq!(h.ticks(), 0);
        h.mouse_moved(320.0, 240.0);
        h.left_button(true);
        assert!(h.is_grabbing());
    }

    #[test]
    fn click_on_empty_space_grabs_nothing() {
        let mut h = harness();
        h.tick(1.0 / 60.0);
        h.mouse_moved(10.0, 10.0);
        h.left_button(true);
        assert!(!h.is_grabbing());
    }

    #[test]
    fn grabbed_body_follows_the_mouse() {
        let mut h = harness();
        h.tick(1.0 / 60.0);
        h.mouse_moved(320.0, 240.0);
        h.left_button(true);

        h.mouse_moved(420.0, 240.0);
        for _ in 0..120 {
            h.tick(1.0 / 60.0);
        }
        let space = h.scene().space();
        let body = space.body_handles().find(|b| space.body_kind(*b) == Some(BodyKind::Dynamic)).unwrap();
        assert!(space.body_position(body).unwrap().x > 50.0);
    }

    #[test]
    fn right_down_lasts_one_tick() {
        let mut h = harness();
        h.right_button(true);
        h.tick(1.0 / 60.0);
        assert!(!h.right_down);
        assert!(h.right_click);
        h.right_button(false);
        assert!(!h.right_click);
    }

    // ── display ───────────────────────────────────────────────────────────

    #[test]
    fn display_fills_a_frame_without_gpu() {
        let mut h = harness();
        h.display(640, 480, 0.0);
        h.display(640, 480, 0.05);
        assert!(!h.renderer().frame().is_empty());
        assert_relative_eq!(h.renderer().state.scale_factor, 1.0);
    }

    #[test]
    fn reshape_tracks_framebuffer() {
        let mut h = harness();
        h.display(1280, 960, 0.0);
        assert_relative_eq!(h.renderer().state.scale_factor, 2.0);
    }
}
