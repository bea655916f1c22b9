use crate::net::connection::Connection;
use crate::net::SocketEvent;
use log::{error, warn};
use mio::Interest;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

pub struct SocketPoller {
    poll: mio::Poll,
    events: mio::Events,
}

impl SocketPoller {
    pub fn new() -> io::Result<Self> {
        let poll = mio::Poll::new()?;
        let events = mio::Events::with_capacity(256);
        Ok(Self { poll, events })
    }

    pub fn register_connection(&mut self, conn: &mut Connection) -> io::Result<()> {
        self.poll.registry().register(
            &mut conn.socket,
            conn.token,
            Interest::READABLE | Interest::WRITABLE,
        )
    }

    pub fn deregister_connection(&mut self, conn: &mut Connection) {
        if let Err(err) = self.poll.registry().deregister(&mut conn.socket) {
            warn!("Could not deregister connection {}: {:?}", conn.token.0, err);
        }
    }

    pub fn tick(&mut self, timeout: Duration) -> HashMap<mio::Token, u8> {
        let mut triggers = HashMap::new();
        if let Err(err) = self.poll.poll(&mut self.events, Some(timeout)) {
            if err.kind() != io::ErrorKind::Interrupted {
                error!("Poll failed: {:?}", err);
            }
            return triggers;
        }
        for event in &self.events {
            let mut trigger = 0;
            if event.is_readable() {
                trigger |= SocketEvent::Readable as u8;
            }
            if event.is_writable() {
                trigger |= SocketEvent::Writable as u8;
            }
            if event.is_error() || (event.is_read_closed() && event.is_write_closed()) {
                trigger |= SocketEvent::Closed as u8;
            }

            *triggers.entry(event.token()).or_insert(trigger) |= trigger;
        }
        triggers
    }
}
