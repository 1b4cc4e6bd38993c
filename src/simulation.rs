use crate::buffer_pair::ParticleBufferPair;
use crate::buffer_util::{make_uniform_buffer, SizedBuffer};
use crate::demo_params::{DemoParams, Variant};
use crate::errors::{SchedulerError, StartupError};
use crate::frame_clock::FrameTiming;
use crate::particle::Particle;
use crate::program::{ParticleProgram, ProgramSources, SimUniforms, SPRITE_CORNERS};
use crate::scheduler::{DrawSource, FeedbackTarget, FrameReport, FrameScheduler};

// The seed the simple variant starts from.
pub fn simple_seed() -> Vec<Particle> {
    [0.0, 0.1, 0.2, 0.3, 0.4]
        .iter()
        .map(|x| Particle::at([*x, 0.0, 0.0], 5.0))
        .collect()
}

// Owns everything the GPU simulation needs across frames.
pub struct ParticleSimulation {
    program: ParticleProgram,
    buffers: ParticleBufferPair,
    uniforms: SimUniforms,
    uniform_buffer: SizedBuffer,
    uniform_bind_group: wgpu::BindGroup,
    clear_color: wgpu::Color,
    scheduler: FrameScheduler,
}

impl ParticleSimulation {
    pub fn init(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        params: &DemoParams,
        now: f64,
    ) -> Result<Self, StartupError> {
        let sources = ProgramSources::for_variant(params.variant);
        let program = ParticleProgram::compile(device, &sources, &Particle::FIELDS, config.format)?;

        let seed = match params.variant {
            Variant::Simple => simple_seed(),
            Variant::Dense => vec![],
        };
        let buffers = ParticleBufferPair::initialize(device, &program, params.capacity(), &seed)?;
        let capacity = buffers.capacity();

        let uniforms = SimUniforms::new(&params.simulation, config.width, config.height);
        let uniform_buffer = make_uniform_buffer(device, "Simulation uniforms", &uniforms);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Simulation uniforms"),
            layout: program.uniform_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.buffer.as_entire_binding(),
            }],
        });

        let mut scheduler = FrameScheduler::new();
        scheduler.initialize(capacity, now)?;
        log::info!(
            "Simulating {} particles with the {:?} kernels",
            capacity,
            params.variant
        );

        let [r, g, b, a] = params.clear_color;
        Ok(ParticleSimulation {
            program,
            buffers,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            clear_color: wgpu::Color { r, g, b, a },
            scheduler,
        })
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.uniforms.set_viewport(width, height);
        queue.write_buffer(
            &self.uniform_buffer.buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );
    }

    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        now: f64,
    ) -> Result<FrameReport, SchedulerError> {
        let mut frame = GpuFrame {
            queue,
            encoder: device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle frame"),
            }),
            view,
            program: &self.program,
            buffers: &mut self.buffers,
            uniforms: &mut self.uniforms,
            uniform_buffer: &self.uniform_buffer,
            uniform_bind_group: &self.uniform_bind_group,
            clear_color: None,
            default_clear: self.clear_color,
            capture: None,
            draw: None,
        };
        let report = self.scheduler.step(now, &mut frame)?;
        queue.submit(Some(frame.encoder.finish()));
        Ok(report)
    }
}

// Records one frame's feedback pass into a command encoder.
struct GpuFrame<'a> {
    queue: &'a wgpu::Queue,
    encoder: wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    program: &'a ParticleProgram,
    buffers: &'a mut ParticleBufferPair,
    uniforms: &'a mut SimUniforms,
    uniform_buffer: &'a SizedBuffer,
    uniform_bind_group: &'a wgpu::BindGroup,
    clear_color: Option<wgpu::Color>,
    default_clear: wgpu::Color,
    capture: Option<(usize, usize)>,
    draw: Option<DrawSource>,
}

impl<'a> FeedbackTarget for GpuFrame<'a> {
    fn capacity(&self) -> u32 {
        self.buffers.capacity()
    }

    fn active_index(&self) -> usize {
        self.buffers.active_index()
    }

    fn other_index(&self) -> usize {
        self.buffers.other_index()
    }

    fn write_uniforms(&mut self, timing: &FrameTiming) {
        self.uniforms.set_timing(timing);
        self.queue.write_buffer(
            &self.uniform_buffer.buffer,
            0,
            bytemuck::bytes_of(&*self.uniforms),
        );
    }

    fn clear(&mut self) {
        self.clear_color = Some(self.default_clear);
    }

    fn begin_capture(&mut self, source: usize, target: usize) {
        // Queue writes land before this frame's commands, so the count starts at zero.
        self.queue.write_buffer(
            &self.buffers.slot(target).capture_args.buffer,
            crate::buffer_pair::DrawArgs::INSTANCE_COUNT_OFFSET,
            bytemuck::bytes_of(&0u32),
        );
        self.capture = Some((source, target));
    }

    fn draw(&mut self, draw: DrawSource) {
        self.draw = Some(draw);
    }

    fn end_capture(&mut self) {
        let (source, target) = match self.capture.take() {
            Some(roles) => roles,
            None => return,
        };
        let draw = match self.draw.take() {
            Some(draw) => draw,
            None => return,
        };
        let load = match self.clear_color.take() {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        let source_slot = self.buffers.slot(source);
        let target_slot = self.buffers.slot(target);

        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Particle feedback pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(self.program.pipeline());
        rpass.set_bind_group(0, self.uniform_bind_group, &[]);
        rpass.set_bind_group(1, &target_slot.capture_bind_group, &[]);
        rpass.set_vertex_buffer(0, source_slot.particles.buffer.slice(..));
        match draw {
            DrawSource::Seeded { count } => rpass.draw(0..SPRITE_CORNERS, 0..count),
            DrawSource::Captured { source } => {
                rpass.draw_indirect(&self.buffers.slot(source).capture_args.buffer, 0)
            }
        }
    }

    fn swap(&mut self) {
        self.buffers.swap();
    }
}
