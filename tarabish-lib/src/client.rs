use std::cmp;
use std::collections::{HashMap, VecDeque};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::net::packet::{packet_to_message, Packet};
use crate::net::packets::*;
use crate::net::structs::{TableInfo, TableView};
use crate::net::{self, Message, Net, NetEvent};
use crate::server::{InvalidOperation, Server};
use crate::{ClientConfig, ErrorKind, LobbyEvent, Result, APP_VERSION, PROTOCOL_VERSION};

const POLL_SLICE: Duration = Duration::from_millis(20);

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub enum SessionState {
    Closed,
    Initializing,
    Authenticating,
    Running,
}

enum Response {
    Login(LoginResponse),
    Tables(GetTablesResponse),
    Sit(SitResponse),
}

/// Blocking RPC client for the lobby server.
///
/// Requests are written to the socket and the client then pumps the network
/// until the matching response arrives. Anything the server pushes meanwhile
/// is queued as a [`LobbyEvent`] until the next [`poll_events`](Self::poll_events).
pub struct LobbyClient {
    config: ClientConfig,
    net: Net,
    addr: Option<SocketAddr>,
    state: SessionState,
    next_request_id: u32,
    responses: HashMap<u32, Response>,
    awaiting: Option<u32>,
    events: VecDeque<LobbyEvent>,
    net_events: Vec<NetEvent>,
}

impl LobbyClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            config,
            net: Net::new()?,
            addr: None,
            state: SessionState::Closed,
            next_request_id: 0,
            responses: HashMap::new(),
            awaiting: None,
            events: VecDeque::new(),
            net_events: Vec::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Pump the socket for at most `timeout`.
    pub fn tick(&mut self, timeout: Duration) {
        self.net.tick(timeout);
        self.dispatch_net_events();
    }

    pub fn poll_events(&mut self, events: &mut Vec<LobbyEvent>) {
        events.extend(self.events.drain(..));
    }

    fn dispatch_net_events(&mut self) {
        self.net.poll_events(&mut self.net_events);
        let net_events: Vec<NetEvent> = self.net_events.drain(..).collect();
        for event in net_events {
            match event {
                NetEvent::Packet(addr, packet) if Some(addr) == self.addr => {
                    if let Err(err) = self.handle_packet(packet) {
                        error!("Dropping malformed packet: {}", err);
                    }
                }
                NetEvent::Closed(addr) if Some(addr) == self.addr => {
                    self.session_closed("Connection closed by server".to_owned());
                }
                NetEvent::Packet(addr, packet) => {
                    debug!("Ignoring {:?} from stale peer {}", packet.packet_type, addr);
                }
                NetEvent::Closed(_) => {}
            }
        }
    }

    fn handle_packet(&mut self, packet: Packet) -> net::Result<()> {
        match packet.packet_type {
            PacketType::LoginResponse => {
                let response: LoginResponse = packet_to_message(&packet)?;
                self.store_response(response.request_id, Response::Login(response));
            }
            PacketType::GetTablesResponse => {
                let response: GetTablesResponse = packet_to_message(&packet)?;
                self.store_response(response.request_id, Response::Tables(response));
            }
            PacketType::SitResponse => {
                let response: SitResponse = packet_to_message(&packet)?;
                self.store_response(response.request_id, Response::Sit(response));
            }
            PacketType::PlayerSat => {
                let message: PlayerSat = packet_to_message(&packet)?;
                let PlayerSat {
                    name,
                    table_id,
                    seat,
                } = message;
                self.events.push_back(LobbyEvent::PlayerSat {
                    name,
                    table_id,
                    seat,
                });
            }
            PacketType::PlayerStood => {
                let message: PlayerStood = packet_to_message(&packet)?;
                let PlayerStood {
                    table_id,
                    seat,
                    name,
                } = message;
                self.events.push_back(LobbyEvent::PlayerStood {
                    table_id,
                    seat,
                    name,
                });
            }
            PacketType::PacketPing => {
                let ping: PacketPing = packet_to_message(&packet)?;
                let pong = PacketPong {
                    id: ping.id,
                    peer_time: ping.peer_time,
                };
                if let Err(err) = self.send(&pong) {
                    warn!("Could not answer ping: {}", err);
                }
            }
            PacketType::FatalError => {
                let fatal: FatalError = packet_to_message(&packet)?;
                error!("Server reported a fatal error: {}", fatal.message);
                self.close_session();
                self.session_closed(fatal.message);
            }
            other => {
                warn!("Unexpected packet {:?} from server", other);
            }
        }
        Ok(())
    }

    /// Forget the session. Only a running session reports `Disconnected`.
    fn session_closed(&mut self, message: String) {
        let was_running = self.state == SessionState::Running;
        self.state = SessionState::Closed;
        self.addr = None;
        self.responses.clear();
        if was_running {
            info!("Disconnected: {}", message);
            self.events.push_back(LobbyEvent::Disconnected { message });
        }
    }

    fn close_session(&mut self) {
        if let Some(addr) = self.addr {
            self.net.disconnect(addr);
        }
    }

    fn abort(&mut self) {
        self.close_session();
        self.state = SessionState::Closed;
        self.addr = None;
        self.responses.clear();
    }

    fn send<'de, T: Message<'de>>(&mut self, message: &T) -> Result<()> {
        let addr = self.addr.ok_or_else(|| Box::new(ErrorKind::NotConnected))?;
        self.net.send_message(addr, message)?;
        Ok(())
    }

    fn request_id(&mut self) -> u32 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    /// Responses nobody waits for anymore, after a timeout, are dropped.
    fn store_response(&mut self, request_id: u32, response: Response) {
        if self.awaiting == Some(request_id) {
            self.responses.insert(request_id, response);
        } else {
            debug!("Dropping late response to request {}", request_id);
        }
    }

    fn wait_for(&mut self, what: &'static str, request_id: u32) -> Result<Response> {
        self.awaiting = Some(request_id);
        let result = self.pump_until_response(what, request_id);
        self.awaiting = None;
        result
    }

    fn pump_until_response(&mut self, what: &'static str, request_id: u32) -> Result<Response> {
        let deadline = Instant::now() + self.config.rpc_timeout;
        loop {
            if let Some(response) = self.responses.remove(&request_id) {
                return Ok(response);
            }
            if self.state == SessionState::Closed {
                return Err(Box::new(ErrorKind::ConnectionClosed));
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Box::new(ErrorKind::Timeout(what)));
            }
            self.tick(cmp::min(deadline - now, POLL_SLICE));
        }
    }

    fn login(&mut self, name: &str) -> Result<()> {
        self.send(&PacketInit {
            protocol_version: PROTOCOL_VERSION,
            app_version: APP_VERSION,
        })?;

        self.state = SessionState::Authenticating;
        let request_id = self.request_id();
        self.send(&LoginRequest {
            request_id,
            name: name.to_owned(),
        })?;
        match self.wait_for("login", request_id)? {
            Response::Login(LoginResponse { error: None, .. }) => Ok(()),
            Response::Login(LoginResponse {
                error: Some(message),
                ..
            }) => Err(Box::new(ErrorKind::InvalidOperation(message))),
            _ => Err(Box::new(ErrorKind::InvalidOperation(
                "Unexpected response to login".to_owned(),
            ))),
        }
    }

    fn ensure_running(&self) -> std::result::Result<(), InvalidOperation> {
        if self.state == SessionState::Running {
            Ok(())
        } else {
            Err(InvalidOperation::new("Not connected"))
        }
    }
}

impl Server for LobbyClient {
    fn connect_to_server(&mut self, host: &str, name: &str) -> Result<()> {
        if self.state != SessionState::Closed {
            return Err(Box::new(ErrorKind::AlreadyConnected));
        }
        if name.trim().is_empty() {
            return Err(Box::new(ErrorKind::InvalidArg(
                "Name must not be empty".to_owned(),
            )));
        }
        let addr = (host, self.config.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Box::new(ErrorKind::InvalidArg(format!("Could not resolve {}", host))))?;

        info!("Connecting to {} as {}", addr, name);
        self.net.connect(addr)?;
        self.addr = Some(addr);
        self.state = SessionState::Initializing;

        if let Err(err) = self.login(name) {
            self.abort();
            return Err(err);
        }
        self.state = SessionState::Running;
        self.events.push_back(LobbyEvent::Connected);
        Ok(())
    }

    fn disconnect_from_server(&mut self) -> Result<()> {
        if self.state != SessionState::Running {
            return Err(Box::new(ErrorKind::NotConnected));
        }
        self.close_session();
        self.session_closed("Disconnected".to_owned());
        Ok(())
    }

    fn get_tables(&mut self) -> std::result::Result<Vec<TableInfo>, InvalidOperation> {
        self.ensure_running()?;
        let request_id = self.request_id();
        self.send(&GetTablesRequest { request_id })
            .map_err(|err| InvalidOperation::new(err.to_string()))?;
        match self.wait_for("tables", request_id) {
            Ok(Response::Tables(GetTablesResponse {
                error: Some(message),
                ..
            })) => Err(InvalidOperation::new(message)),
            Ok(Response::Tables(response)) => Ok(response.tables),
            Ok(_) => Err(InvalidOperation::new("Unexpected response to table list")),
            Err(err) => Err(InvalidOperation::new(err.to_string())),
        }
    }

    fn sit(&mut self, table_id: i32, seat: u8) -> std::result::Result<TableView, InvalidOperation> {
        self.ensure_running()?;
        let request_id = self.request_id();
        self.send(&SitRequest {
            request_id,
            table_id,
            seat,
        })
        .map_err(|err| InvalidOperation::new(err.to_string()))?;
        match self.wait_for("seat", request_id) {
            Ok(Response::Sit(SitResponse {
                error: Some(message),
                ..
            })) => Err(InvalidOperation::new(message)),
            Ok(Response::Sit(SitResponse {
                table_view: Some(view),
                ..
            })) => Ok(view),
            Ok(_) => Err(InvalidOperation::new("Unexpected response to sit")),
            Err(err) => Err(InvalidOperation::new(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::net::packet::{message_to_packet, packet_to_message, Packet};
    use crate::net::packet_decoder::PacketDecoder;
    use crate::net::packet_encoder::PacketEncoder;
    use crate::net::packets::*;
    use crate::net::structs::{Seat, TableInfo, TableView};
    use crate::net::Message;
    use crate::{ClientConfig, LobbyClient, LobbyEvent, Server};

    struct FakePeer {
        stream: TcpStream,
        decoder: PacketDecoder,
    }

    impl FakePeer {
        fn new(stream: TcpStream) -> Self {
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
            Self {
                stream,
                decoder: PacketDecoder::new(),
            }
        }

        fn recv(&mut self) -> Packet {
            let mut buffer = [0; 1024];
            loop {
                if let Some(packet) = self.decoder.next_packet().unwrap() {
                    return packet;
                }
                let n = self.stream.read(&mut buffer).unwrap();
                assert!(n > 0, "client closed the connection");
                self.decoder.push_buffer(buffer[..n].to_vec().into());
            }
        }

        fn recv_message<T: for<'de> Message<'de>>(&mut self) -> T {
            let packet = self.recv();
            let message: T = packet_to_message(&packet).unwrap();
            assert_eq!(message.packet_type(), packet.packet_type);
            message
        }

        fn send<'de, T: Message<'de>>(&mut self, message: &T) {
            let mut encoder = PacketEncoder::new(8 * 1024);
            encoder.add_packet(message_to_packet(message).unwrap());
            while let Some(buffer) = encoder.next_buffer() {
                self.stream.write_all(&buffer).unwrap();
            }
        }

        fn wait_closed(&mut self) {
            let mut buffer = [0; 64];
            while let Ok(n) = self.stream.read(&mut buffer) {
                if n == 0 {
                    break;
                }
            }
        }
    }

    fn table(table_id: i32) -> TableInfo {
        TableInfo {
            table_id,
            seats: [Seat::open(), Seat::taken("Bob"), Seat::open(), Seat::open()],
        }
    }

    fn client_for(listener: &TcpListener) -> LobbyClient {
        client_with_timeout(listener, Duration::from_secs(5))
    }

    fn client_with_timeout(listener: &TcpListener, rpc_timeout: Duration) -> LobbyClient {
        LobbyClient::new(ClientConfig {
            port: listener.local_addr().unwrap().port(),
            rpc_timeout,
        })
        .unwrap()
    }

    /// Accepts the client and lets its login through.
    fn accept_login(listener: &TcpListener) -> FakePeer {
        let (stream, _) = listener.accept().unwrap();
        let mut peer = FakePeer::new(stream);
        let _: PacketInit = peer.recv_message();
        let login: LoginRequest = peer.recv_message();
        peer.send(&LoginResponse {
            request_id: login.request_id,
            error: None,
        });
        peer
    }

    /// Ticks the client until it reports a disconnect, returns every event seen.
    fn tick_until_disconnected(client: &mut LobbyClient) -> Vec<LobbyEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            client.tick(Duration::from_millis(20));
            client.poll_events(&mut events);
            if let Some(LobbyEvent::Disconnected { .. }) = events.last() {
                break;
            }
        }
        events
    }

    #[test]
    fn login_tables_and_sit() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client_for(&listener);

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut peer = FakePeer::new(stream);

            let init: PacketInit = peer.recv_message();
            assert_eq!(init.protocol_version, crate::PROTOCOL_VERSION);
            let login: LoginRequest = peer.recv_message();
            assert_eq!(login.name, "Alice");
            peer.send(&LoginResponse {
                request_id: login.request_id,
                error: None,
            });

            let request: GetTablesRequest = peer.recv_message();
            peer.send(&PlayerSat {
                name: "Bob".to_owned(),
                table_id: 7,
                seat: 1,
            });
            peer.send(&GetTablesResponse {
                request_id: request.request_id,
                error: None,
                tables: vec![table(7)],
            });

            let sit: SitRequest = peer.recv_message();
            assert_eq!((sit.table_id, sit.seat), (7, 1));
            peer.send(&SitResponse {
                request_id: sit.request_id,
                error: Some("seat taken".to_owned()),
                table_view: None,
            });

            let sit: SitRequest = peer.recv_message();
            peer.send(&SitResponse {
                request_id: sit.request_id,
                error: None,
                table_view: Some(TableView {
                    table_id: 7,
                    seats: [Seat::taken("Alice"), Seat::taken("Bob"), Seat::open(), Seat::open()],
                }),
            });

            peer.wait_closed();
        });

        client.connect_to_server("127.0.0.1", "Alice").unwrap();
        assert!(client.is_connected());

        let tables = client.get_tables().unwrap();
        assert_eq!(tables, vec![table(7)]);

        let err = client.sit(7, 1).unwrap_err();
        assert_eq!(err.message, "seat taken");

        let view = client.sit(7, 0).unwrap();
        assert_eq!(view.seats[0].name, "Alice");

        client.disconnect_from_server().unwrap();
        assert!(!client.is_connected());

        let mut events = Vec::new();
        client.poll_events(&mut events);
        assert_eq!(
            events,
            vec![
                LobbyEvent::Connected,
                LobbyEvent::PlayerSat {
                    name: "Bob".to_owned(),
                    table_id: 7,
                    seat: 1
                },
                LobbyEvent::Disconnected {
                    message: "Disconnected".to_owned()
                },
            ]
        );

        server.join().unwrap();
    }

    #[test]
    fn rejected_login_stays_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client_for(&listener);

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut peer = FakePeer::new(stream);
            let _: PacketInit = peer.recv_message();
            let login: LoginRequest = peer.recv_message();
            peer.send(&LoginResponse {
                request_id: login.request_id,
                error: Some("name in use".to_owned()),
            });
            peer.wait_closed();
        });

        let err = client.connect_to_server("127.0.0.1", "Alice").unwrap_err();
        assert_eq!(err.to_string(), "name in use");
        assert!(!client.is_connected());

        let mut events = Vec::new();
        client.poll_events(&mut events);
        assert!(events.is_empty());
        server.join().unwrap();
    }

    #[test]
    fn answers_ping_and_closes_on_fatal_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client_for(&listener);

        let server = thread::spawn(move || {
            let mut peer = accept_login(&listener);
            peer.send(&PacketPing {
                id: "p1".to_owned(),
                peer_time: 42,
            });
            let pong: PacketPong = peer.recv_message();
            assert_eq!((pong.id.as_str(), pong.peer_time), ("p1", 42));
            peer.send(&FatalError {
                message: "kicked".to_owned(),
            });
            peer.wait_closed();
        });

        client.connect_to_server("127.0.0.1", "Alice").unwrap();
        let events = tick_until_disconnected(&mut client);

        assert_eq!(
            events,
            vec![
                LobbyEvent::Connected,
                LobbyEvent::Disconnected {
                    message: "kicked".to_owned()
                },
            ]
        );
        assert!(!client.is_connected());
        assert_eq!(client.get_tables().unwrap_err().message, "Not connected");
        server.join().unwrap();
    }

    #[test]
    fn server_closing_socket_disconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client_for(&listener);

        let server = thread::spawn(move || {
            let mut peer = accept_login(&listener);
            // Hang up in the middle of a call
            let _: GetTablesRequest = peer.recv_message();
            drop(peer);
        });

        client.connect_to_server("127.0.0.1", "Alice").unwrap();
        let err = client.get_tables().unwrap_err();
        assert_eq!(err.message, "Connection closed");
        server.join().unwrap();
        let events = tick_until_disconnected(&mut client);

        assert_eq!(
            events,
            vec![
                LobbyEvent::Connected,
                LobbyEvent::Disconnected {
                    message: "Connection closed by server".to_owned()
                },
            ]
        );
        assert!(!client.is_connected());
    }

    #[test]
    fn late_response_is_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client_with_timeout(&listener, Duration::from_millis(200));

        let server = thread::spawn(move || {
            let mut peer = accept_login(&listener);
            let first: GetTablesRequest = peer.recv_message();
            thread::sleep(Duration::from_millis(400));
            peer.send(&GetTablesResponse {
                request_id: first.request_id,
                error: None,
                tables: vec![table(1)],
            });
            let second: GetTablesRequest = peer.recv_message();
            assert_ne!(first.request_id, second.request_id);
            peer.send(&GetTablesResponse {
                request_id: second.request_id,
                error: None,
                tables: vec![table(2)],
            });
            peer.wait_closed();
        });

        client.connect_to_server("127.0.0.1", "Alice").unwrap();
        let err = client.get_tables().unwrap_err();
        assert_eq!(err.message, "Timed out waiting for tables");

        // Wait for the stale answer to reach the client
        thread::sleep(Duration::from_millis(500));
        client.tick(Duration::from_millis(50));
        assert!(client.responses.is_empty());

        assert_eq!(client.get_tables().unwrap(), vec![table(2)]);
        assert!(client.responses.is_empty());

        client.disconnect_from_server().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn calls_fail_when_not_connected() {
        let mut client = LobbyClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.get_tables().unwrap_err().message, "Not connected");
        assert_eq!(client.sit(1, 0).unwrap_err().message, "Not connected");
        assert!(client.disconnect_from_server().is_err());
        assert!(client.connect_to_server("127.0.0.1", "  ").is_err());
    }
}
