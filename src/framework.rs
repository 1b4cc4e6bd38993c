use std::sync::Arc;
use std::time::Instant;

use feedback_particles::demo_params::DemoParams;
use feedback_particles::errors::StartupError;
use feedback_particles::fps_estimator::{title_with_fps, FpsEstimator};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};

gflags::define! {
    --log_filter: &str = "warn,feedback_particles=info"
}
gflags::define! {
    -h, --help = false
}

// "Framework" for a windowed executable.
pub trait Demo: 'static + Sized {
    fn load_params() -> DemoParams;
    fn required_features() -> wgpu::Features;
    fn init(
        params: &DemoParams,
        config: &wgpu::SurfaceConfiguration,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Self, StartupError>;
    fn resize(&mut self, config: &wgpu::SurfaceConfiguration, queue: &wgpu::Queue);
    fn render(&mut self, view: &wgpu::TextureView, device: &wgpu::Device, queue: &wgpu::Queue);
}

// Polled once per loop iteration.
#[derive(Debug, Default, Clone, Copy)]
struct InputState {
    escape: bool,
    close_requested: bool,
}

impl InputState {
    // Latched until the loop exits; a release in the same batch does not undo it.
    fn on_key(&mut self, key: &Key, state: ElementState) {
        if *key == Key::Named(NamedKey::Escape) && state == ElementState::Pressed {
            self.escape = true;
        }
    }

    fn exit_requested(&self) -> bool {
        self.escape || self.close_requested
    }
}

async fn run_async<E: Demo>(title: &'static str) -> Result<(), StartupError> {
    gflags::parse();
    if HELP.flag {
        gflags::print_help_and_exit(0);
    }
    if let Err(e) = scrub_log::init_with_filter_string(LOG_FILTER.flag) {
        eprintln!("Failed to initialize logging: {:?}", e);
    }
    let params = E::load_params();

    let event_loop = EventLoop::new()?;
    log::info!("Initializing the window...");
    let window = Arc::new(
        winit::window::WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                params.window_width,
                params.window_height,
            ))
            .build(&event_loop)?,
    );

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let surface = instance.create_surface(window.clone())?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .ok_or(StartupError::NoAdapter)?;
    log::info!("Using adapter: {:?}", adapter.get_info());

    let missing_features = E::required_features() - adapter.features();
    if !missing_features.is_empty() {
        return Err(StartupError::MissingFeatures(missing_features));
    }
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: E::required_features(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            },
            None,
        )
        .await?;

    let size = window.inner_size();
    let mut config = surface
        .get_default_config(&adapter, size.width.max(1), size.height.max(1))
        .ok_or(StartupError::UnsupportedSurface)?;
    config.present_mode = if params.vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    };
    surface.configure(&device, &config);

    log::info!("Initializing the demo...");
    let mut demo = E::init(&params, &config, &device, &queue)?;
    let mut input = InputState::default();
    let mut fps = FpsEstimator::new(Instant::now());

    log::info!("Entering render loop...");
    event_loop.run(move |event, target| {
        target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => input.close_requested = true,
                WindowEvent::KeyboardInput { event, .. } => {
                    input.on_key(&event.logical_key, event.state);
                }
                WindowEvent::Resized(size) => {
                    log::info!("Resizing to {:?}", size);
                    config.width = size.width.max(1);
                    config.height = size.height.max(1);
                    surface.configure(&device, &config);
                    demo.resize(&config, &queue);
                }
                WindowEvent::RedrawRequested => {
                    let frame = match surface.get_current_texture() {
                        Ok(frame) => frame,
                        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                            surface.configure(&device, &config);
                            return;
                        }
                        Err(e) => {
                            log::warn!("Skipping frame: {:?}", e);
                            return;
                        }
                    };
                    let view = frame
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    demo.render(&view, &device, &queue);
                    frame.present();
                    if let Some(rate) = fps.tick(Instant::now()) {
                        window.set_title(&title_with_fps(title, rate));
                    }
                }
                _ => (),
            },
            Event::AboutToWait => {
                if input.exit_requested() {
                    log::info!("Exiting");
                    target.exit();
                } else {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    })?;
    Ok(())
}

pub fn run<E: Demo>(title: &'static str) -> Result<(), StartupError> {
    futures::executor::block_on(run_async::<E>(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_survives_release() {
        let escape = Key::Named(NamedKey::Escape);
        let mut input = InputState::default();
        input.on_key(&escape, ElementState::Pressed);
        input.on_key(&escape, ElementState::Released);
        assert!(input.exit_requested());
    }

    #[test]
    fn other_keys_do_not_exit() {
        let mut input = InputState::default();
        input.on_key(&Key::Named(NamedKey::Space), ElementState::Pressed);
        input.on_key(&Key::Named(NamedKey::Escape), ElementState::Released);
        assert!(!input.exit_requested());
    }
}
