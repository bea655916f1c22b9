use std::collections::VecDeque;
use std::io;
use std::net::Shutdown;

use mio::event::Source;
use mio::net::TcpStream;
use mio::{Interest, Registry, Token};

use crate::utils::buffer_processor::{BufferProcessor, Direction};
use crate::utils::byte_buffer::ByteBuffer;

pub struct TcpSocket {
    pub stream: TcpStream,
    connected: bool,
    closed: bool,
    processors: Vec<Box<dyn BufferProcessor>>,

    pub unprocessed_in: VecDeque<ByteBuffer>,
    pub unprocessed_out: VecDeque<ByteBuffer>,
    pub processed_in: VecDeque<ByteBuffer>,
    pub processed_out: VecDeque<ByteBuffer>,
}

impl TcpSocket {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            connected: false,
            closed: false,
            processors: Vec::new(),
            unprocessed_in: VecDeque::new(),
            unprocessed_out: VecDeque::new(),
            processed_in: VecDeque::new(),
            processed_out: VecDeque::new(),
        }
    }

    pub fn add_buffer_processor(&mut self, buffer_processor: Box<dyn BufferProcessor>) {
        self.processors.push(buffer_processor);
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Called on the first writable event after a non blocking connect.
    /// Fails if the connect itself failed.
    pub fn connected(&mut self) -> io::Result<()> {
        if let Some(err) = self.stream.take_error()? {
            return Err(err);
        }
        // Errors with NotConnected while the handshake is still in flight
        self.stream.peer_addr()?;
        self.stream.set_nodelay(true)?;
        self.connected = true;
        Ok(())
    }

    pub fn close(&mut self) {
        if !self.closed {
            // The peer may already be gone, nothing left to do then
            let _ = self.stream.shutdown(Shutdown::Both);
            self.closed = true;
        }
    }

    pub fn process_in(&mut self) {
        while let Some(mut buffer) = self.unprocessed_in.pop_front() {
            for processor in self.processors.iter_mut().rev() {
                buffer = processor.process_buffer(buffer, Direction::In);
            }
            self.processed_in.push_back(buffer);
        }
    }

    pub fn process_out(&mut self) {
        while let Some(mut buffer) = self.unprocessed_out.pop_front() {
            for processor in self.processors.iter_mut() {
                buffer = processor.process_buffer(buffer, Direction::Out);
            }
            self.processed_out.push_back(buffer);
        }
    }
}

impl Source for TcpSocket {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        self.stream.register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> io::Result<()> {
        self.stream.reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        self.stream.deregister(registry)
    }
}
