mod framework;

use std::time::Instant;

use feedback_particles::demo_params::{get_demo_config_from_default_file, DemoParams, Variant};
use feedback_particles::errors::StartupError;
use feedback_particles::simulation::ParticleSimulation;
use log::error;

gflags::define! {
    --config: &str = "demo_config.toml"
}

gflags::define! {
    /// Overrides the configured variant: "simple" or "dense".
    --variant: &str = ""
}

struct ParticleDemo {
    simulation: ParticleSimulation,
    start: Instant,
}

impl ParticleDemo {
    fn read_config_from_file(path: &str) -> anyhow::Result<DemoParams> {
        let params = std::fs::read_to_string(path)?.parse()?;
        Ok(params)
    }

    fn get_demo_config() -> DemoParams {
        let mut params = match ParticleDemo::read_config_from_file(CONFIG.flag) {
            Ok(params) => params,
            Err(e) => {
                error!("Failed to parse config file({}): {:?}", CONFIG.flag, e);
                get_demo_config_from_default_file()
            }
        };
        if !VARIANT.flag.is_empty() {
            match VARIANT.flag.parse::<Variant>() {
                Ok(variant) => params.variant = variant,
                Err(e) => error!("Ignoring --variant: {}", e),
            }
        }
        params
    }
}

impl framework::Demo for ParticleDemo {
    fn load_params() -> DemoParams {
        ParticleDemo::get_demo_config()
    }

    fn required_features() -> wgpu::Features {
        // The update kernel writes its output records from the vertex stage.
        wgpu::Features::VERTEX_WRITABLE_STORAGE
    }

    fn init(
        params: &DemoParams,
        config: &wgpu::SurfaceConfiguration,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) -> Result<Self, StartupError> {
        log::info!("Running!");
        let simulation = ParticleSimulation::init(device, config, params, 0.0)?;
        Ok(ParticleDemo {
            simulation,
            start: Instant::now(),
        })
    }

    fn resize(&mut self, config: &wgpu::SurfaceConfiguration, queue: &wgpu::Queue) {
        self.simulation.resize(queue, config.width, config.height);
    }

    fn render(&mut self, view: &wgpu::TextureView, device: &wgpu::Device, queue: &wgpu::Queue) {
        let now = self.start.elapsed().as_secs_f64();
        if let Err(e) = self.simulation.render(device, queue, view, now) {
            error!("Frame failed: {}", e);
        }
    }
}

fn main() {
    if let Err(e) = framework::run::<ParticleDemo>("Feedback Particles") {
        error!("Startup failed: {}", e);
        eprintln!("Startup failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_config() {
        let deserialized_config = ParticleDemo::read_config_from_file(CONFIG.flag).unwrap();
        println!("deserialized = {:?}", deserialized_config);
        assert!(deserialized_config.capacity() > 0);
    }
}
