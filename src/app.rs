use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::{
    config::AppConfig,
    gfx::{rendering::render_engine::RenderEngine, scene::Scene},
    input::{InputEvent, InputState},
    time::FrameClock,
    ui::{wave_studio_panel, UiManager, WaveStudio},
    world::build_scene,
};

pub struct OceanApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    input: InputState,
    clock: FrameClock,
    studio: WaveStudio,
    fatal_error: Option<anyhow::Error>,
}

impl OceanApp {
    /// Builds the scene on the CPU; GPU resources follow once the window exists
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let scene = build_scene(&config);
        let studio = WaveStudio::new(config.spectrum.clone(), config.water.wave_function);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                input: InputState::default(),
                clock: FrameClock::new(),
                studio,
                fatal_error: None,
            },
        })
    }

    /// Runs the event loop until the window closes or Escape is pressed
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop failed")?;

        match self.app_state.fatal_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("Ocean Simulator")
                    .with_inner_size(winit::dpi::PhysicalSize::new(
                        self.config.width,
                        self.config.height,
                    )),
            )
            .context("failed to create window")?;
        let window_handle = Arc::new(window);
        let (width, height) = window_handle.inner_size().into();

        let window_clone = window_handle.clone();
        let shader_dir = self.config.shader_dir();
        let verbose_shaders = self.config.verbose_shaders;
        let mut renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, &shader_dir, verbose_shaders).await
        })?;

        self.scene.camera_manager.resize(width, height);
        renderer.init_scene(&mut self.scene)?;

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );

        self.window = Some(window_handle);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        Ok(())
    }

    fn apply_cursor_grab(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        self.input.cursor_grab_changed = false;

        if self.input.cursor_captured {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                log::warn!("cursor grab unavailable: {}", err);
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("cursor release failed: {}", err);
            }
            window.set_cursor_visible(true);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.clone())
        else {
            return;
        };

        let frame = self.clock.tick();
        self.scene.update(frame, &mut self.input);
        render_engine.update(&mut self.scene, frame, self.input.debug_normals);

        let fps = self.clock.fps();
        let wireframe = self.input.wireframe;
        let scene = &self.scene;
        let studio = &mut self.studio;

        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => render_engine.render_frame_with_ui(
                scene,
                wireframe,
                |device, queue, encoder, color_attachment| {
                    ui_manager.draw(device, queue, encoder, &window, color_attachment, |ui| {
                        wave_studio_panel(ui, studio, scene, fps);
                    });
                },
            ),
            None => render_engine.render_frame(
                scene,
                wireframe,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(err) => log::warn!("frame skipped: {}", err),
        }

        self.studio.apply(&mut self.scene.water);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            log::error!("{:#}", err);
            self.fatal_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let input_event = InputEvent::from_window_event(&event);

        // UI gets input first, unless the camera owns the cursor
        if !self.input.cursor_captured {
            if let Some(ui_manager) = self.ui_manager.as_mut() {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                if ui_manager.handle_input(&window, &ui_event) {
                    // Releases always land so held keys can't stick
                    if let Some(released) = input_event.filter(InputEvent::is_release) {
                        self.input.handle(released);
                    }
                    return;
                }
            }
        }

        if let Some(input_event) = input_event {
            self.input.handle(input_event);
        }
        if self.input.quit_requested {
            event_loop.exit();
            return;
        }
        if self.input.cursor_grab_changed {
            self.apply_cursor_grab();
        }
        if let Some((width, height)) = self.input.resized.take() {
            self.scene.camera_manager.resize(width, height);
            if let Some(render_engine) = self.render_engine.as_mut() {
                render_engine.resize(width, height);
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        if !self.input.cursor_captured {
            return;
        }
        if let Some(input_event) = InputEvent::from_device_event(&event) {
            self.input.handle(input_event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
