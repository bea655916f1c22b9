use crate::net::packet::Packet;
use crate::net::packet_decoder::PacketDecoder;
use crate::net::packet_encoder::PacketEncoder;
use crate::net::transport::tcp_socket::TcpSocket;
use crate::utils::buffer_processor::BufferProcessor;
use bytes::Bytes;
use log::{debug, trace};
use mio::net::TcpStream;
use std::io;
use std::io::{Read, Write};
use std::net::SocketAddr;

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub enum ConnState {
    Connecting,
    Open,
    Closed,
}

pub struct PeerInfo {
    pub addr: SocketAddr,
}

impl PeerInfo {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

pub struct Connection {
    pub token: mio::Token,
    pub peer_info: PeerInfo,
    pub state: ConnState,

    pub socket: TcpSocket,
    pub tcp_encoder: PacketEncoder,
    pub tcp_decoder: PacketDecoder,
}

impl Connection {
    /// Create the connection and issue non blocking connect
    pub fn open(addr: SocketAddr, token: mio::Token) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let socket = TcpSocket::new(stream);
        Ok(Self {
            token,
            peer_info: PeerInfo::new(addr),
            state: ConnState::Connecting,
            socket,
            tcp_encoder: PacketEncoder::new(8 * 1024),
            tcp_decoder: PacketDecoder::new(),
        })
    }

    /// Add a buffer processor to be executed when sending and receiving buffers.
    /// Buffer processors are ran in added order for outbound, and backwards for inbound.
    /// So if you first add a processor to do encryption and then another to do compression,
    /// Outgoing packets will be encrypted, then compressed, whereas incoming packets will
    /// be decompressed, and then decrypted.
    pub fn add_buffer_processor(&mut self, buffer_processor: Box<dyn BufferProcessor>) {
        self.socket.add_buffer_processor(buffer_processor);
    }

    pub fn send(&mut self, packet: Packet) {
        self.tcp_encoder.add_packet(packet);
    }

    /// Decode whatever was read so far into `packets` and push pending packets to the socket.
    pub fn flush(&mut self, packets: &mut Vec<Packet>) -> crate::Result<()> {
        // In
        self.socket.process_in();
        while let Some(buffer) = self.socket.processed_in.pop_front() {
            self.tcp_decoder.push_buffer(buffer);
        }
        while let Some(packet) = self.tcp_decoder.next_packet()? {
            packets.push(packet);
        }

        // Out
        while let Some(buffer) = self.tcp_encoder.next_buffer() {
            self.socket.unprocessed_out.push_back(buffer);
        }
        self.socket.process_out();

        if !self.socket.processed_out.is_empty() {
            self.write()?;
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.socket.close();
        self.state = ConnState::Closed;
    }

    /// Read as much as possible from the connection's socket.
    /// Buffers are read into the given buffer, and pushed to be processed.
    pub fn read(&mut self, read_buffer: &mut [u8]) -> io::Result<()> {
        loop {
            match self.socket.stream.read(read_buffer) {
                Ok(0) => return Err(io::ErrorKind::ConnectionAborted.into()),
                Ok(n) => {
                    trace!("Read {} bytes from {}", n, self.peer_info.addr);
                    self.socket
                        .unprocessed_in
                        .push_back(Bytes::copy_from_slice(&read_buffer[..n]).into())
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// Process buffers and write as much as possible to the connection's socket.
    pub fn write(&mut self) -> io::Result<()> {
        if !self.socket.is_connected() {
            // Connected (i.e we received the first write event after connect)
            match self.socket.connected() {
                Ok(()) => {
                    self.state = ConnState::Open;
                    debug!("Connection {} to {} established", self.token.0, self.peer_info.addr);
                }
                Err(err) if err.kind() == io::ErrorKind::NotConnected => return Ok(()),
                Err(err) => return Err(err),
            }
        }

        self.socket.process_out();
        while let Some(buffer) = self.socket.processed_out.front_mut() {
            match self.socket.stream.write(&buffer[..]) {
                Ok(n) if n < buffer.len() => {
                    trace!("Written {} bytes, truncating buffer", n);
                    buffer.skip(n);
                }
                Ok(n) => {
                    trace!("Written {} bytes", n);
                    self.socket.processed_out.pop_front();
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
