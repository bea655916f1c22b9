use crate::net::packet::PacketInfo;
use crate::net::structs::*;
use log::info;
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

const MAX_PACKET_TYPES: usize = 500;

macro_rules! declare_packets {
    ($
        ($struct:ident {
            $($field:ident: $type:ty),* $(,)?
        })
    +) => {
        $(
            #[derive(Debug, Serialize, Deserialize)]
            pub struct $struct {
                $(
                    pub $field: $type,
                )*
            }

            impl $struct {
                pub const TYPE: PacketType = PacketType::$struct;
                pub const INFO: PacketInfo = PacketInfo {
                    packet_type: Self::TYPE,
                    name: stringify!($struct),
                    fixed_size: None,
                };

                pub fn register(packets: &mut [Option<PacketInfo>; packet_count()]) {
                    assert!((Self::TYPE as usize) < MAX_PACKET_TYPES, "Max number of packets reached");
                    packets[Self::TYPE as usize] = Some(Self::INFO);
                }
            }

            impl crate::net::Message<'_> for $struct {
                fn packet_type(&self) -> PacketType {
                    Self::TYPE
                }
                fn packet_info(&self) -> PacketInfo {
                    Self::INFO
                }
            }
        )+

        fn init_packets(types: &mut [Option<PacketInfo>; packet_count()]) {
            $(
                $struct::register(types);
            )+
        }
    };
}

declare_packets! {
    FatalError {
        message: String,
    }
    PacketInit {
        protocol_version: u16,
        app_version: u16,
    }
    PacketPing {
        id: String,
        peer_time: u64,
    }
    PacketPong {
        id: String,
        peer_time: u64,
    }
    LoginRequest {
        request_id: u32,
        name: String,
    }
    LoginResponse {
        request_id: u32,
        error: Option<String>,
    }
    GetTablesRequest {
        request_id: u32,
    }
    GetTablesResponse {
        request_id: u32,
        error: Option<String>,
        tables: Vec<TableInfo>,
    }
    SitRequest {
        request_id: u32,
        table_id: i32,
        seat: u8,
    }
    SitResponse {
        request_id: u32,
        error: Option<String>,
        table_view: Option<TableView>,
    }
    PlayerSat {
        name: String,
        table_id: i32,
        seat: u8,
    }
    PlayerStood {
        table_id: i32,
        seat: u8,
        name: String,
    }
}

lazy_static! {
    static ref PACKET_INFOS: [Option<PacketInfo>; packet_count()] = {
        let mut types = [None; packet_count()];
        init_packets(&mut types);
        types
    };
}

#[derive(Debug, Copy, Clone, PartialEq, FromPrimitive)]
#[repr(u16)]
pub enum PacketType {
    FatalError = 0,
    PacketInit = 1,
    PacketPing = 2,
    PacketPong = 3,
    LoginRequest = 4,
    LoginResponse = 5,
    GetTablesRequest = 6,
    GetTablesResponse = 7,
    SitRequest = 8,
    SitResponse = 9,
    PlayerSat = 10,
    PlayerStood = 11,

    Last,
}

pub fn init() {
    info!(
        "Initialized {} packet types",
        PACKET_INFOS.iter().filter(|info| info.is_some()).count()
    );
}

pub const fn packet_count() -> usize {
    PacketType::Last as usize
}

pub fn has(packet_type: PacketType) -> bool {
    (packet_type as usize) < packet_count() && PACKET_INFOS[packet_type as usize].is_some()
}

pub fn get(packet_type: PacketType) -> PacketInfo {
    match PACKET_INFOS.get(packet_type as usize).copied().flatten() {
        Some(info) => info,
        None => panic!("Packet type {:?} is not registered!", packet_type),
    }
}
