pub mod buffer_pair;
pub mod buffer_util;
pub mod demo_params;
pub mod errors;
pub mod fps_estimator;
pub mod frame_clock;
pub mod kernel;
pub mod particle;
pub mod program;
pub mod reference;
pub mod scheduler;
pub mod shader_util;
pub mod simulation;
