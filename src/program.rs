use std::borrow::Cow;

use crate::demo_params::{SimulationParams, Variant};
use crate::errors::{CompileError, LinkError, ProgramError, ShaderStage};
use crate::frame_clock::FrameTiming;
use crate::particle::Particle;

// Each particle is drawn as a triangle strip quad.
pub const SPRITE_CORNERS: u32 = 4;

pub struct ProgramSources {
    pub update: Cow<'static, str>,
    pub shade: Cow<'static, str>,
}

impl ProgramSources {
    pub fn for_variant(variant: Variant) -> Self {
        let (update, shade) = match variant {
            Variant::Simple => (
                crate::include_shader!("simple_update.wgsl"),
                crate::include_shader!("simple_shade.wgsl"),
            ),
            Variant::Dense => (
                crate::include_shader!("dense_update.wgsl"),
                crate::include_shader!("dense_shade.wgsl"),
            ),
        };
        ProgramSources {
            update: Cow::Borrowed(update),
            shade: Cow::Borrowed(shade),
        }
    }
}

// This should match `Uniforms` in particle_layout.wgsl.tera.
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SimUniforms {
    pub time: f32,
    pub delta_time: f32,
    pub viewport: [f32; 2],
    pub gravity: [f32; 4],
    pub emitter: [f32; 4],
    pub speed_range: [f32; 2],
    pub life_range: [f32; 2],
    pub size_range: [f32; 2],
    _padding: [f32; 2],
}

impl SimUniforms {
    pub fn new(params: &SimulationParams, width: u32, height: u32) -> Self {
        let [gx, gy, gz] = params.gravity;
        let [ex, ey, ez] = params.emission_point;
        let mut uniforms = SimUniforms {
            gravity: [gx, gy, gz, 0.0],
            emitter: [ex, ey, ez, 1.0],
            speed_range: params.speed_range,
            life_range: params.life_range,
            size_range: params.size_range,
            ..SimUniforms::default()
        };
        uniforms.set_viewport(width, height);
        uniforms
    }

    pub fn set_timing(&mut self, timing: &FrameTiming) {
        self.time = timing.time as f32;
        self.delta_time = timing.delta as f32;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = [width.max(1) as f32, height.max(1) as f32];
    }
}

/// The captured fields must be exactly the particle record, in order.
pub fn check_capture_layout(captured_fields: &[&str]) -> Result<(), LinkError> {
    if captured_fields == &Particle::FIELDS[..] {
        Ok(())
    } else {
        Err(LinkError::CaptureLayout {
            expected: Particle::FIELDS.to_vec(),
            found: captured_fields.iter().map(|f| f.to_string()).collect(),
        })
    }
}

// The update stage doubles as the vertex stage; the shade stage is the fragment stage.
pub struct ParticleProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    capture_layout: wgpu::BindGroupLayout,
}

impl ParticleProgram {
    pub fn compile(
        device: &wgpu::Device,
        sources: &ProgramSources,
        captured_fields: &[&str],
        format: wgpu::TextureFormat,
    ) -> Result<Self, ProgramError> {
        let update_module = ParticleProgram::compile_stage(device, &sources.update, ShaderStage::Update)?;
        let shade_module = ParticleProgram::compile_stage(device, &sources.shade, ShaderStage::Shade)?;
        check_capture_layout(captured_fields)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation uniforms layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<SimUniforms>() as _),
                },
                count: None,
            }],
        });
        let capture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Capture target layout"),
            entries: &[
                // Captured particle records
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(Particle::STRIDE),
                    },
                    count: None,
                },
                // Captured record count, laid out as indirect draw args
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<crate::buffer_pair::DrawArgs>() as _
                        ),
                    },
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle program layout"),
            bind_group_layouts: &[&uniform_layout, &capture_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle program"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &update_module,
                entry_point: "vs_main",
                compilation_options: Default::default(),
                buffers: &[Particle::vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shade_module,
                entry_point: "fs_main",
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });
        if let Some(error) = futures::executor::block_on(device.pop_error_scope()) {
            log::error!("Particle program failed to link: {}", error);
            return Err(LinkError::Pipeline(error.to_string()).into());
        }
        log::info!("Particle program linked, capturing {:?}", captured_fields);

        Ok(ParticleProgram {
            pipeline,
            uniform_layout,
            capture_layout,
        })
    }

    fn compile_stage(
        device: &wgpu::Device,
        source: &str,
        stage: ShaderStage,
    ) -> Result<wgpu::ShaderModule, CompileError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("Particle {} module", stage)),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        });
        match futures::executor::block_on(device.pop_error_scope()) {
            Some(error) => {
                log::error!("Failed to compile {} stage: {}", stage, error);
                Err(CompileError {
                    stage,
                    diagnostics: error.to_string(),
                })
            }
            None => Ok(module),
        }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    pub fn capture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.capture_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_shader() {
        // 20 floats, a multiple of the 16 byte uniform alignment.
        assert_eq!(std::mem::size_of::<SimUniforms>(), 80);
        let uniforms = SimUniforms::new(&SimulationParams::default(), 640, 480);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniforms));
        assert_eq!(&floats[2..4], &[640.0, 480.0]);
        assert_eq!(&floats[4..8], &[0.0, -1.0, 0.0, 0.0]);
        assert_eq!(&floats[8..12], &[0.0, -0.8, 0.0, 1.0]);
    }

    #[test]
    fn timing_and_viewport() {
        let mut uniforms = SimUniforms::new(&SimulationParams::default(), 0, 0);
        assert_eq!(uniforms.viewport, [1.0, 1.0]);
        uniforms.set_timing(&FrameTiming {
            time: 2.5,
            delta: 0.125,
        });
        assert_eq!((uniforms.time, uniforms.delta_time), (2.5, 0.125));
        uniforms.set_viewport(800, 600);
        assert_eq!(uniforms.viewport, [800.0, 600.0]);
    }

    #[test]
    fn capture_layout_must_match_record() {
        assert!(check_capture_layout(&Particle::FIELDS).is_ok());
        let reordered = ["velocity", "position", "life", "size"];
        match check_capture_layout(&reordered) {
            Err(LinkError::CaptureLayout { found, .. }) => assert_eq!(found[0], "velocity"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(check_capture_layout(&["position"]).is_err());
    }

    #[test]
    fn variant_sources_declare_entry_points() {
        for variant in [Variant::Simple, Variant::Dense] {
            let sources = ProgramSources::for_variant(variant);
            assert!(sources.update.contains("fn vs_main"));
            assert!(sources.shade.contains("fn fs_main"));
            // The shared layout is spliced in at build time.
            assert!(sources.update.contains("struct CapturedParticle"));
            assert!(sources.update.contains("atomicMax"));
        }
    }
}
