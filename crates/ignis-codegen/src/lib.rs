//! Kernel synthesis pipeline for the ignis stress-test generator.
//!
//! Turns a declarative hardware profile and workload mix into the textual
//! init/work function pairs a downstream compiler builds into measurement
//! workers, through four stages: sequence interleaving, footprint
//! planning, register-rotation emission, and output writing.
//!
//! The pipeline is single-threaded, synchronous, and batch-oriented; the
//! generated kernels are what run concurrently at measurement time.

pub mod emit;
pub mod footprint;
pub mod pipeline;
pub mod report;
pub mod sequence;
pub mod writer;

pub use emit::{
    emit_kernel, expand_bundles, template_for, Bundle, EmissionTemplate, KernelFunctions, L1Step,
    PrefetchTier, RegisterFile, RotationState,
};
pub use footprint::{residual_bytes, ThreadPlan};
pub use pipeline::{generate, generate_pair, GenerationConfig};
pub use report::GenerationReport;
pub use sequence::Sequence;
pub use writer::OutputWriter;
