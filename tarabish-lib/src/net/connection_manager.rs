use crate::net::connection::{ConnState, Connection};
use crate::net::packet::Packet;
use crate::net::socket_poller::SocketPoller;
use crate::net::{NetEvent, SocketEvent};
use crate::utils::buffer_processor::LogBufferProcessor;
use log::{error, info};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::mem;
use std::net::SocketAddr;
use std::time::Duration;

pub struct ConnectionManager {
    poller: SocketPoller,
    connections: Vec<Option<Connection>>,
    free_tokens: VecDeque<mio::Token>,
    tokens: HashMap<SocketAddr, mio::Token>,
    recv_buffer: Vec<u8>,
    flushables: HashSet<mio::Token>,
    closing: HashSet<mio::Token>,
}

impl ConnectionManager {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poller: SocketPoller::new()?,
            connections: Vec::new(),
            free_tokens: VecDeque::new(),
            tokens: HashMap::new(),
            recv_buffer: vec![0; 4096],
            flushables: HashSet::new(),
            closing: HashSet::new(),
        })
    }

    /// Init a connection to the given address, replacing any previous one
    pub fn connect(&mut self, addr: SocketAddr) -> io::Result<()> {
        self.new_connection(addr).map(|_| ())
    }

    pub fn disconnect(&mut self, addr: SocketAddr) {
        if let Some(token) = self.tokens.remove(&addr) {
            self.release(token);
        }
    }

    pub fn send(&mut self, peer: SocketAddr, packet: Packet) {
        let token = if let Some(&token) = self.tokens.get(&peer) {
            match self.connections.get_mut(token.0) {
                Some(Some(conn)) => conn.send(packet),
                _ => return,
            }
            token
        } else {
            info!("No connection to {} yet, initiating.", peer);
            let conn = match self.new_connection(peer) {
                Ok(conn) => conn,
                Err(err) => {
                    error!("Could not create new connection: {:?}", err);
                    return;
                }
            };
            conn.send(packet);
            conn.token
        };
        self.flushables.insert(token);
    }

    fn new_connection(&mut self, addr: SocketAddr) -> io::Result<&mut Connection> {
        if let Some(token) = self.tokens.remove(&addr) {
            self.release(token);
        }
        let token = self
            .free_tokens
            .pop_front()
            .unwrap_or_else(|| mio::Token(self.connections.len()));
        let mut conn = Connection::open(addr, token)?;
        conn.add_buffer_processor(Box::new(LogBufferProcessor));
        self.poller.register_connection(&mut conn)?;

        if token.0 == self.connections.len() {
            self.connections.push(None);
        }
        self.tokens.insert(addr, token);
        Ok(self.connections[token.0].insert(conn))
    }

    /// Close the connection behind `token` and make the token reusable.
    fn release(&mut self, token: mio::Token) {
        if let Some(mut conn) = self.connections.get_mut(token.0).and_then(Option::take) {
            if conn.state != ConnState::Closed {
                conn.close();
                self.poller.deregister_connection(&mut conn);
            }
            self.free_tokens.push_back(token);
        }
        self.flushables.remove(&token);
        self.closing.remove(&token);
    }

    fn close_connection(&mut self, token: mio::Token, incoming_events: &mut VecDeque<NetEvent>) {
        let addr = match self.connections.get(token.0) {
            Some(Some(conn)) => conn.peer_info.addr,
            _ => return,
        };
        info!("Closing connection {} to {}", token.0, addr);
        self.tokens.remove(&addr);
        self.release(token);
        incoming_events.push_back(NetEvent::Closed(addr));
    }

    fn should_close(err_kind: io::ErrorKind) -> bool {
        match err_kind {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => true,
            _ => false,
        }
    }

    fn readable(&mut self, token: mio::Token) {
        let conn = match self.connections.get_mut(token.0) {
            Some(Some(conn)) => conn,
            _ => return,
        };
        if let Err(err) = conn.read(&mut self.recv_buffer) {
            if Self::should_close(err.kind()) {
                info!("Connection {} read ended: {:?}", token.0, err.kind());
            } else {
                error!("Unhandled read error {:?}", err);
            }
            // Whatever was read before the error still gets decoded
            self.closing.insert(token);
        }
        self.flushables.insert(token);
    }

    fn writable(&mut self, token: mio::Token) {
        if let Some(Some(conn)) = self.connections.get_mut(token.0) {
            if let Err(err) = conn.write() {
                error!("Closing connection {} due to {:?}", token.0, err);
                self.closing.insert(token);
            }
        }
    }

    pub fn tick(&mut self, incoming_events: &mut VecDeque<NetEvent>, timeout: Duration) {
        let triggers = self.poller.tick(timeout);
        for (&token, &trigger) in triggers.iter() {
            if (trigger & SocketEvent::Readable as u8) != 0 {
                self.readable(token);
            }
            if (trigger & SocketEvent::Writable as u8) != 0 {
                self.writable(token);
            }
            if (trigger & SocketEvent::Closed as u8) != 0 {
                self.closing.insert(token);
            }
        }

        if !self.flushables.is_empty() {
            let flushables = mem::replace(&mut self.flushables, HashSet::new());
            let mut packets = Vec::new();
            for token in flushables {
                if let Some(Some(conn)) = self.connections.get_mut(token.0) {
                    let addr = conn.peer_info.addr;
                    let result = conn.flush(&mut packets);
                    incoming_events.extend(packets.drain(..).map(|packet| NetEvent::Packet(addr, packet)));
                    if let Err(err) = result {
                        error!("Closing connection {} due to {}", token.0, err);
                        self.closing.insert(token);
                    }
                }
            }
        }

        if !self.closing.is_empty() {
            let closing = mem::replace(&mut self.closing, HashSet::new());
            for token in closing {
                self.close_connection(token, incoming_events);
            }
        }
    }
}
