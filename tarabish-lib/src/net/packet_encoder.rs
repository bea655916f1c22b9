use std::collections::VecDeque;

use byteorder::{BigEndian, WriteBytesExt};
use log::trace;

use crate::net::packet::{Packet, PacketFlag};
use crate::net::packets;
use crate::utils::byte_buffer::ByteBuffer;

const MAX_PACKET_HEADER_SIZE: usize = 6;

/// Packs queued packets into buffers of roughly `target_size` bytes.
pub struct PacketEncoder {
    pub target_size: usize,
    pub buffers: VecDeque<ByteBuffer>,
    pub packets: VecDeque<Packet>,
}

impl PacketEncoder {
    pub fn new(target_size: usize) -> Self {
        Self {
            target_size,
            buffers: VecDeque::new(),
            packets: VecDeque::new(),
        }
    }

    pub fn add_packet(&mut self, packet: Packet) {
        self.packets.push_back(packet);
    }

    pub fn next_buffer(&mut self) -> Option<ByteBuffer> {
        if !self.buffers.is_empty() {
            return self.buffers.pop_front();
        }

        self.pack(self.target_size);
        self.buffers.pop_front()
    }

    fn pack(&mut self, target_size: usize) {
        if self.packets.is_empty() {
            return;
        }

        let mut packet_count = 0;
        let mut result: Vec<u8> = Vec::with_capacity(target_size);
        while let Some(packet) = self.packets.front() {
            if !result.is_empty()
                && packet.data_size() + MAX_PACKET_HEADER_SIZE + result.len() > target_size
            {
                break;
            }
            let packet = match self.packets.pop_front() {
                Some(packet) => packet,
                None => break,
            };
            write_packet(&mut result, &packet);
            packet_count += 1;
        }

        trace!(
            "Packed {} packet(s) into buffer ({} bytes)",
            packet_count,
            result.len()
        );
        self.buffers.push_back(result.into());
    }
}

fn write_packet(result: &mut Vec<u8>, packet: &Packet) {
    let packet_info = packets::get(packet.packet_type);
    let flags_offset = result.len();

    // Writing into a Vec cannot fail
    // Flags
    let _ = result.write_u8(packet.flags);

    // Type
    if packet.short_type() {
        let _ = result.write_u8(packet.packet_type as u8);
        result[flags_offset] |= PacketFlag::ShortType as u8;
    } else {
        let _ = result.write_u16::<BigEndian>(packet.packet_type as u16);
    }

    // Size
    if packet_info.fixed_size.is_none() {
        if packet.data_size() < 256 {
            let _ = result.write_u8(packet.data_size() as u8);
            result[flags_offset] |= PacketFlag::ShortSize as u8;
        } else {
            let _ = result.write_u24::<BigEndian>(packet.data_size() as u32);
            result[flags_offset] &= !(PacketFlag::ShortSize as u8);
        }
    }

    // Data
    result.extend_from_slice(&packet.data);
}
