use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Update,
    Shade,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Update => write!(f, "update (vertex)"),
            ShaderStage::Shade => write!(f, "shade (fragment)"),
        }
    }
}

/// A kernel stage was rejected by the shader compiler.
#[derive(Error, Debug)]
#[error("{stage} stage failed to compile:\n{diagnostics}")]
pub struct CompileError {
    pub stage: ShaderStage,
    pub diagnostics: String,
}

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("captured fields {found:?} do not match the particle layout {expected:?}")]
    CaptureLayout {
        expected: Vec<&'static str>,
        found: Vec<String>,
    },
    #[error("program failed to link:\n{0}")]
    Pipeline(String),
}

#[derive(Error, Debug)]
pub enum ProgramError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Link(#[from] LinkError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BufferError {
    #[error("particle capacity must be greater than zero")]
    EmptyCapacity,
    #[error("{seeded} seed particles do not fit in a capacity of {capacity}")]
    SeedOverflow { seeded: usize, capacity: u32 },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("step() called before initialize()")]
    NotInitialized,
    #[error("scheduled {scheduled} particles but the buffers hold {available}")]
    CapacityExceeded { scheduled: u32, available: u32 },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Anything that stops the demo before the first frame.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create the window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create a surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter found")]
    NoAdapter,
    #[error("adapter is missing required features: {0:?}")]
    MissingFeatures(wgpu::Features),
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
    #[error("failed to open the device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
