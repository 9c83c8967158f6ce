use std::error::Error;
use std::sync::Arc;

use glam::Vec3;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::GardenConfig;
use crate::debug::timer::SystemPhase;
use crate::debug::{Controls, DebugOverlay, GardenStats};
use crate::render::instance::SpriteInstance;
use crate::render::scene;
use crate::render::trail::{ColorVertex, TrailSystem};
use crate::render::view::PlanView;
use crate::render::GpuState;
use crate::sim::Simulation;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    sim: Simulation,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<DebugOverlay>,

    last_frame_time: Option<Instant>,

    // Screen dimensions
    screen_w: u32,
    screen_h: u32,
    view: PlanView,

    trails: TrailSystem,

    // Reusable per-frame buffers
    petal_buf: Vec<ColorVertex>,
    sprite_buf: Vec<SpriteInstance>,
    trail_samples: Vec<(Vec3, [f32; 3])>,
}

impl App {
    fn new(sim: Simulation) -> Self {
        let view = PlanView::fit(1, 1, sim.config.half_extent());
        Self {
            sim,
            window: None,
            gpu: None,
            overlay: None,
            last_frame_time: None,
            screen_w: 1,
            screen_h: 1,
            view,
            trails: TrailSystem::new(),
            petal_buf: Vec::new(),
            sprite_buf: Vec::new(),
            trail_samples: Vec::new(),
        }
    }

    fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_w = width.max(1);
        self.screen_h = height.max(1);
        self.view = PlanView::fit(self.screen_w, self.screen_h, self.sim.config.half_extent());
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Escape => {
                log::info!("ESC pressed, exiting");
                event_loop.exit();
            }
            KeyCode::F12 => {
                if let Some(overlay) = &mut self.overlay {
                    overlay.toggle();
                }
            }
            KeyCode::Space => {
                self.sim.paused = !self.sim.paused;
                log::info!("Simulation {}", if self.sim.paused { "paused" } else { "resumed" });
            }
            KeyCode::KeyT => self.trails.enabled = !self.trails.enabled,
            _ => {}
        }
    }

    /// Turn the simulation into GPU-ready geometry for this frame.
    fn build_frame(&mut self) {
        let alpha = self.sim.interpolation_alpha();
        let focus = self.sim.focus();

        self.sim.timers.begin();
        scene::build_petals(&self.sim.world, &self.view, &mut self.petal_buf);
        scene::build_sprites(
            &self.sim.world,
            &self.view,
            alpha,
            focus,
            self.sim.attention_radius,
            &mut self.sprite_buf,
        );
        scene::trail_samples(&self.sim.world, &mut self.trail_samples);
        self.trails.update(&self.trail_samples);
        self.sim.timers.end(SystemPhase::BuildMesh);
    }

    fn render(&mut self) {
        let (Some(window), Some(gpu), Some(overlay)) =
            (&self.window, &mut self.gpu, &mut self.overlay)
        else {
            return;
        };

        self.sim.timers.begin();
        let trail_verts: &[ColorVertex] = if self.trails.enabled {
            self.trails.build_vertices(&self.view)
        } else {
            &[]
        };
        gpu.upload(&self.petal_buf, trail_verts, &self.sprite_buf);
        self.sim.timers.end(SystemPhase::GpuUpload);

        let stats = garden_stats(&self.sim);
        let mut controls = Controls {
            paused: self.sim.paused,
            attention_radius: self.sim.attention_radius,
            show_trails: self.trails.enabled,
        };
        let (primitives, textures_delta, screen_descriptor) = overlay.run_frame(
            window,
            self.screen_w,
            self.screen_h,
            &stats,
            &self.sim.timers,
            &mut controls,
        );
        self.sim.paused = controls.paused;
        self.sim.attention_radius = controls.attention_radius;
        self.trails.enabled = controls.show_trails;

        if overlay.present_mode_changed {
            overlay.present_mode_changed = false;
            gpu.set_present_mode(overlay.selected_present_mode());
        }

        self.sim.timers.begin();
        let Some(mut frame) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_garden(&mut frame.encoder, &frame.view);

        let egui_cmds = overlay.prepare_egui(
            &gpu.device,
            &gpu.queue,
            &mut frame.encoder,
            &primitives,
            &textures_delta,
            &screen_descriptor,
        );
        {
            let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
            overlay.render_egui(&mut pass, &primitives, &screen_descriptor);
        }
        gpu.finish_frame(frame.encoder, frame.output, egui_cmds);
        overlay.free_textures(&textures_delta);
        self.sim.timers.end(SystemPhase::RenderSubmit);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Bloomfield")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.set_screen_size(size.width, size.height);
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = match GpuState::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("Failed to initialise wgpu: {e}");
                event_loop.exit();
                return;
            }
        };
        log::info!("wgpu + garden pipelines initialized");

        self.overlay = Some(DebugOverlay::new(&window, &gpu));
        self.gpu = Some(gpu);

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);

        self.window = Some(window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&self.window, &mut self.overlay) {
            (Some(window), Some(overlay)) if overlay.visible => {
                overlay.on_window_event(window, &event)
            }
            (Some(window), Some(overlay)) => {
                // Keep egui's input state current even while hidden.
                overlay.on_window_event(window, &event);
                false
            }
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.set_screen_size(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                if let PhysicalKey::Code(key) = event.physical_key {
                    // Function keys always reach the app, even over egui widgets.
                    if !consumed || matches!(key, KeyCode::Escape | KeyCode::F12) {
                        self.on_key(event_loop, key);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } if !consumed => {
                let u = position.x as f32 / self.screen_w as f32;
                let v = position.y as f32 / self.screen_h as f32;
                self.sim.set_pointer(u, v);
            }
            WindowEvent::RedrawRequested => {
                // --- Timing ---
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();
                    if let Some(overlay) = &mut self.overlay {
                        overlay.record_frame(dt);
                    }
                    self.sim.advance(dt);
                }
                self.last_frame_time = Some(now);

                self.build_frame();
                self.render();
            }
            _ => {}
        }
    }
}

fn garden_stats(sim: &Simulation) -> GardenStats {
    GardenStats {
        flowers: sim.flower_count(),
        butterflies: sim.config.butterfly_count,
        tick_count: sim.tick_count(),
        sim_time: sim.time(),
        focus: sim.focus().into(),
        report: sim.last_report,
    }
}

/// Entry point: plant the garden, create the event loop and run.
pub fn run() -> Result<(), Box<dyn Error>> {
    let sim = Simulation::new(GardenConfig::default())?;
    log::info!(
        "Garden planted: {} flowers, {} butterflies",
        sim.flower_count(),
        sim.config.butterfly_count
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(sim);
    event_loop.run_app(&mut app)?;
    Ok(())
}
