use crate::bytecode::op::Instr;
use serde::{Deserialize, Serialize};

/// A compiled flint script: one flat instruction stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBc {
    pub instrs: Vec<Instr>,
}

impl ScriptBc {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self { instrs: Vec::new() }
    }

    /// Encode as a portable binary image (`.flb`).
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decode an image produced by [`ScriptBc::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

impl Default for ScriptBc {
    fn default() -> Self {
        Self::new()
    }
}
