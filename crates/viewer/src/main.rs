//! Planetarium, a small solar system viewer: one sun and five planets
//! orbiting it, drawn as textured planes with a free-look camera.

mod config;

use anyhow::Result;
use config::ViewerConfig;
use engine_core::Time;
use glam::{Mat4, Vec3};
use input::InputState;
use renderer::{load_obj, Camera, InstanceRaw, Mesh, Renderer, Texture};
use scene::{SolarSystem, SystemConfig};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

const PLANE_MODEL_PATH: &str = "assets/models/plane.obj";
const SUN_TEXTURE_PATH: &str = "assets/textures/sun.png";
const PLANET_TEXTURE_PATH: &str = "assets/textures/planet.png";

/// Model uniform slot assignments. The sun always draws from slot 0;
/// planets use the slots after it (one shared slot when instancing).
const SUN_SLOT: usize = 0;
const PLANET_SLOT_BASE: usize = 1;

/// Everything the viewer needs per frame: simulation, input, camera,
/// GPU resources.
struct ViewerState {
    time: Time,
    input: InputState,
    renderer: Renderer,
    camera: Camera,

    system: SolarSystem,
    plane_mesh: Mesh,
    sun_texture: Texture,
    /// One texture per planet, in planet order. Loaded independently so
    /// each body keeps its own GPU resources.
    planet_textures: Vec<Texture>,

    /// When true, all planets go through one instanced draw call.
    instanced: bool,
    running: bool,
}

impl ViewerState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let system_config = SystemConfig::default();
        let mut renderer = Renderer::new(window, system_config.planet_count as u32).await?;

        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 150.0));
        camera.set_aspect(renderer.size.width, renderer.size.height);
        camera.sensitivity = config.sensitivity;
        camera.speed = config.move_speed;

        let plane_mesh = load_obj(PLANE_MODEL_PATH).upload(&renderer.device);
        if plane_mesh.is_empty() {
            log::error!("plane mesh is empty; nothing will be drawn");
        }

        let system = SolarSystem::new(&system_config);

        let sun_texture = Texture::load(
            &renderer.device,
            &renderer.queue,
            renderer.texture_layout(),
            SUN_TEXTURE_PATH,
        );
        let planet_textures: Vec<Texture> = (0..system.planets().len())
            .map(|_| {
                Texture::load(
                    &renderer.device,
                    &renderer.queue,
                    renderer.texture_layout(),
                    PLANET_TEXTURE_PATH,
                )
            })
            .collect();

        renderer.ensure_model_slots(PLANET_SLOT_BASE + system.planets().len());

        log::info!(
            "draw path: {}",
            if config.instanced {
                "instanced planets"
            } else {
                "one draw per body"
            }
        );

        Ok(Self {
            time: Time::new(),
            input: InputState::new(),
            renderer,
            camera,
            system,
            plane_mesh,
            sun_texture,
            planet_textures,
            instanced: config.instanced,
            running: true,
        })
    }

    fn update(&mut self) {
        self.time.update();
        let dt = self.time.delta_seconds();

        if self.input.is_quit_pressed() {
            self.running = false;
        }

        if self.input.is_cursor_locked() {
            let look = self.input.mouse_delta();
            // Window y grows downward; flip it so dragging up pitches up.
            self.camera.process_mouse(look.x, -look.y);
        }
        self.camera.process_movement(
            self.input.get_movement_input(),
            self.input.get_vertical_input(),
            dt,
        );

        self.system.update(dt);

        if self.time.frame_count() % 600 == 0 {
            log::debug!("fps: {:.1}", self.time.fps());
        }

        // Clear input for next frame
        self.input.begin_frame();
    }

    fn render(&mut self) -> Result<()> {
        self.renderer.update_camera(&self.camera);
        self.renderer
            .set_model(SUN_SLOT, self.system.sun().model_matrix, false);

        if self.instanced {
            let instances: Vec<InstanceRaw> = self
                .system
                .instance_matrices()
                .iter()
                .map(|m| InstanceRaw::new(m.to_cols_array_2d()))
                .collect();
            self.renderer.upload_instances(&instances);
            self.renderer.set_model(PLANET_SLOT_BASE, Mat4::IDENTITY, true);
        } else {
            for (i, planet) in self.system.planets().iter().enumerate() {
                self.renderer
                    .set_model(PLANET_SLOT_BASE + i, planet.model_matrix, false);
            }
        }

        let (output, mut encoder) = self.renderer.begin_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let plane_mesh = &self.plane_mesh;
        let sun_texture = &self.sun_texture;
        let planet_textures = &self.planet_textures;
        let instanced = self.instanced;
        self.renderer.with_scene_pass(&mut encoder, &view, |renderer, pass| {
            renderer.draw_mesh(pass, plane_mesh, sun_texture, SUN_SLOT);
            if instanced {
                // Every planet loads the same image, so binding the
                // first planet's texture is valid for the whole batch.
                if let Some(texture) = planet_textures.first() {
                    renderer.draw_mesh_instanced(pass, plane_mesh, texture, PLANET_SLOT_BASE);
                }
            } else {
                for (i, texture) in planet_textures.iter().enumerate() {
                    renderer.draw_mesh(pass, plane_mesh, texture, PLANET_SLOT_BASE + i);
                }
            }
        });

        self.renderer.end_frame(output, encoder);
        Ok(())
    }

    fn grab_cursor(&mut self) {
        let _ = self
            .renderer
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.renderer.window.set_cursor_grab(CursorGrabMode::Confined));
        self.renderer.window.set_cursor_visible(false);
        self.input.set_cursor_locked(true);
    }

    fn release_cursor(&mut self) {
        let _ = self.renderer.window.set_cursor_grab(CursorGrabMode::None);
        self.renderer.window.set_cursor_visible(true);
        self.input.set_cursor_locked(false);
    }

    /// Handle a window event. Returns true if the app should exit.
    fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.camera.set_aspect(size.width, size.height);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                }
                false
            }
            WindowEvent::MouseInput { state, .. } => {
                if state.is_pressed() && !self.input.is_cursor_locked() {
                    self.grab_cursor();
                }
                false
            }
            WindowEvent::Focused(focused) => {
                // Deltas gathered around the focus change are stale;
                // drop them so the camera does not snap on regain.
                self.input.clear_mouse_motion();
                if focused {
                    self.grab_cursor();
                } else {
                    self.release_cursor();
                }
                false
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    match e.downcast_ref::<wgpu::SurfaceError>() {
                        Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            self.renderer.resize(self.renderer.size);
                        }
                        Some(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            self.running = false;
                        }
                        _ => log::error!("Render error: {}", e),
                    }
                }
                self.renderer.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    /// Handle device events (raw mouse motion).
    fn handle_device_event(&mut self, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.is_cursor_locked() {
                self.input.process_mouse_motion(delta);
            }
        }
    }
}

/// Application handler for winit.
struct App {
    config: ViewerConfig,
    state: Option<ViewerState>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("Planetarium")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window_width,
                    self.config.window_height,
                ));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match pollster::block_on(ViewerState::new(window.clone(), &self.config)) {
                Ok(mut s) => {
                    s.grab_cursor();
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize viewer: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let Some(state) = &mut self.state {
            state.handle_device_event(event);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Planetarium");
    println!("  WASD  - Move        Mouse  - Look around");
    println!("  E / Q - Rise / descend");
    println!("  Click - Capture cursor");
    println!("  Esc   - Quit");

    log::info!("Starting planetarium viewer");

    let config = ViewerConfig::load();

    let event_loop = EventLoop::new()?;
    // Poll continuously so the orbit simulation advances every loop
    // iteration instead of waiting for input events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
