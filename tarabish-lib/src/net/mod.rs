use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use log::error;
use serde::{Deserialize, Serialize};

use crate::net::connection_manager::ConnectionManager;
use crate::net::packet::{message_to_packet, Packet, PacketInfo};
use crate::net::packets::PacketType;

pub mod connection;
pub mod connection_manager;
pub mod packet;
pub mod packet_decoder;
pub mod packet_encoder;
pub mod packets;
pub mod socket_poller;
pub mod structs;
pub mod transport;

pub type Result<T> = ::std::result::Result<T, Error>;

pub type Error = Box<ErrorKind>;

#[derive(Debug)]
pub enum ErrorKind {
    Serialize(String),
    Deserialize(String),
    InvalidPacketType(PacketType),
    UnknownPacketType(u16),
    InvalidHeader(u8),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Serialize(message) | ErrorKind::Deserialize(message) => {
                write!(f, "{}", message)
            }
            ErrorKind::InvalidPacketType(packet_type) => {
                write!(f, "Unexpected packet type {:?}", packet_type)
            }
            ErrorKind::UnknownPacketType(raw) => write!(f, "Unknown packet type {}", raw),
            ErrorKind::InvalidHeader(flags) => write!(f, "Invalid packet header flags {:#010b}", flags),
        }
    }
}

impl std::error::Error for ErrorKind {}

pub trait Message<'de>: Serialize + Deserialize<'de> {
    fn packet_type(&self) -> PacketType;
    fn packet_info(&self) -> PacketInfo;
    fn serialize_data(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(&self)
    }
    fn deserialize(buffer: &'de [u8]) -> bincode::Result<Self> {
        bincode::deserialize(&buffer[..])
    }
}

#[repr(u8)]
enum SocketEvent {
    Readable = 1 << 0,
    Writable = 1 << 1,
    Closed = 1 << 2,
}

/// What the socket layer hands back to its owner after a tick.
#[derive(Debug)]
pub enum NetEvent {
    Packet(SocketAddr, Packet),
    Closed(SocketAddr),
}

pub struct Net {
    pub connection_manager: ConnectionManager,
    incoming_events: VecDeque<NetEvent>,
}

impl Net {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            connection_manager: ConnectionManager::new()?,
            incoming_events: VecDeque::new(),
        })
    }

    pub fn connect(&mut self, addr: SocketAddr) -> io::Result<()> {
        self.connection_manager.connect(addr)
    }

    pub fn disconnect(&mut self, addr: SocketAddr) {
        self.connection_manager.disconnect(addr);
    }

    pub fn tick(&mut self, timeout: Duration) {
        self.connection_manager
            .tick(&mut self.incoming_events, timeout);
    }

    pub fn poll_events(&mut self, events: &mut Vec<NetEvent>) {
        events.extend(self.incoming_events.drain(..));
    }

    pub fn send_message<'de, T: Message<'de>>(&mut self, peer: SocketAddr, message: &T) -> Result<()> {
        let packet = message_to_packet(message).map_err(|err| {
            error!("Could not convert message {:?} to packet", message.packet_type());
            err
        })?;
        self.send_packet(peer, packet);
        Ok(())
    }

    pub fn send_packet(&mut self, peer: SocketAddr, packet: Packet) {
        self.connection_manager.send(peer, packet);
    }
}
