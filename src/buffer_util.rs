use wgpu::util::DeviceExt;

pub struct SizedBuffer {
    pub buffer: wgpu::Buffer,
    pub size: wgpu::BufferAddress,
}

pub fn make_buffer_init(
    device: &wgpu::Device,
    contents: &[u8],
    usage: wgpu::BufferUsages,
    label: &str,
) -> SizedBuffer {
    SizedBuffer {
        buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        }),
        size: contents.len() as wgpu::BufferAddress,
    }
}

pub fn make_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    data: &T,
) -> SizedBuffer {
    make_buffer_init(
        device,
        bytemuck::bytes_of(data),
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        label,
    )
}
