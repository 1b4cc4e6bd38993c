// This should match the `Particle` struct in shaders/particle_layout.wgsl.tera.
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Particle {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    // Remaining life in seconds.
    pub life: f32,
    // Point sprite diameter in pixels.
    pub size: f32,
}

const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32,
    3 => Float32
];

impl Particle {
    /// Names of the fields written back by the update kernel, in layout order.
    pub const FIELDS: [&'static str; 4] = ["position", "velocity", "life", "size"];

    pub const STRIDE: wgpu::BufferAddress = std::mem::size_of::<Particle>() as wgpu::BufferAddress;

    pub fn at(position: [f32; 3], size: f32) -> Self {
        Particle {
            position,
            size,
            ..Particle::default()
        }
    }

    /// One particle per instance; the four sprite corners come from the vertex index.
    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Particle::STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}
