use crate::utils::byte_buffer::ByteBuffer;
use log::trace;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Direction {
    In,
    Out,
}

/// Transforms raw socket buffers, e.g. for compression or tracing.
pub trait BufferProcessor {
    fn process_buffer(&mut self, buffer: ByteBuffer, direction: Direction) -> ByteBuffer;
}

pub struct LogBufferProcessor;

impl BufferProcessor for LogBufferProcessor {
    fn process_buffer(&mut self, buffer: ByteBuffer, direction: Direction) -> ByteBuffer {
        match direction {
            Direction::In => {
                trace!("Processing received buffer {:?}", &buffer[..]);
            }
            Direction::Out => {
                trace!("Processing sent buffer {:?}", &buffer[..]);
            }
        }
        buffer
    }
}
