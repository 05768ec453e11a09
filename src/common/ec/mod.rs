mod block;
mod decoder;
mod encoder;
mod galois;

pub(crate) use block::*;
pub(crate) use decoder::*;
pub(crate) use encoder::*;

pub const MAX_BLOCK_SIZE: usize = 256;

pub const MAX_EC_SIZE: usize = 64;
