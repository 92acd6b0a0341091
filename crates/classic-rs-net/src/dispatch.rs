//! Opcode dispatch table.
//!
//! Each opcode maps to a handler and the fixed size of its payload. The
//! highest registered opcode bounds what the dispatch loop accepts.

use bytes::Bytes;

use crate::error::NetError;
use crate::link::Link;

/// Handles one packet. `payload` holds exactly the declared payload bytes.
pub type Handler<C> = fn(&mut C, &mut Link, &mut Bytes) -> Result<(), NetError>;

pub struct DispatchTable<C> {
    handlers: [Option<Handler<C>>; 256],
    sizes: [usize; 256],
    max_opcode: Option<u8>,
}

impl<C> Default for DispatchTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DispatchTable<C> {
    pub fn new() -> Self {
        Self {
            handlers: [None; 256],
            sizes: [0; 256],
            max_opcode: None,
        }
    }

    /// Register `handler` for `opcode` with a payload of `size` bytes.
    pub fn set(&mut self, opcode: u8, handler: Handler<C>, size: usize) {
        self.handlers[opcode as usize] = Some(handler);
        self.declare(opcode, size);
    }

    /// Declare the payload size of an opcode without handling it.
    pub fn declare(&mut self, opcode: u8, size: usize) {
        self.sizes[opcode as usize] = size;
        self.max_opcode = Some(self.max_opcode.map_or(opcode, |max| max.max(opcode)));
    }

    /// Payload size for `opcode`, or `None` if it lies above every
    /// registered opcode.
    pub fn size(&self, opcode: u8) -> Option<usize> {
        match self.max_opcode {
            Some(max) if opcode <= max => Some(self.sizes[opcode as usize]),
            _ => None,
        }
    }

    pub fn handler(&self, opcode: u8) -> Option<Handler<C>> {
        self.handlers[opcode as usize]
    }

    pub fn max_opcode(&self) -> Option<u8> {
        self.max_opcode
    }

    pub fn clear(&mut self) {
        self.handlers = [None; 256];
        self.sizes = [0; 256];
        self.max_opcode = None;
    }
}
