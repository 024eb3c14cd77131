//! Internal error type for fallible backend helpers.
//!
//! Never crosses the public `Device`/`CommandQueue` boundary: every public
//! entry point matches on this, logs through `rhi::error::ValidationError`'s
//! classification, and returns the null handle or drops the command.

use std::fmt;

#[derive(Debug)]
pub enum GlError {
    ShaderCompile { stage: &'static str, log: String },
    ProgramLink { log: String },
    FramebufferIncomplete { status: u32 },
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlError::ShaderCompile { stage, log } => {
                write!(f, "{} shader compile failed:\n{}", stage, log)
            }
            GlError::ProgramLink { log } => write!(f, "program link failed:\n{}", log),
            GlError::FramebufferIncomplete { status } => {
                write!(f, "framebuffer incomplete (status = 0x{:x})", status)
            }
        }
    }
}

impl std::error::Error for GlError {}

pub type Result<T> = std::result::Result<T, GlError>;
