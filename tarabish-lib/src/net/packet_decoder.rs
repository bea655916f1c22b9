use crate::net;
use crate::net::packet::{Packet, PacketFlag};
use crate::net::packets;
use crate::net::packets::PacketType;
use crate::net::ErrorKind;
use crate::utils::byte_buffer::ByteBuffer;
use byteorder::{BigEndian, ByteOrder};
use bytes::BytesMut;
use log::debug;
use num_traits::FromPrimitive;

pub struct PacketDecoder {
    stream: BytesMut,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            stream: BytesMut::with_capacity(8 * 1024),
        }
    }

    pub fn push_buffer(&mut self, buffer: ByteBuffer) {
        self.stream.extend_from_slice(&buffer[..]);
    }

    /// Next complete packet in the stream, `None` while more bytes are needed.
    /// A malformed header poisons the stream: the connection must be dropped.
    pub fn next_packet(&mut self) -> net::Result<Option<Packet>> {
        if self.stream.is_empty() {
            return Ok(None);
        }

        let flags = self.stream[0];
        if flags & PacketFlag::FixedHeader as u8 == 0 {
            return Err(Box::new(ErrorKind::InvalidHeader(flags)));
        }

        // Header
        let mut header_size = 1;
        if flags & PacketFlag::ShortType as u8 != 0 {
            header_size += 1;
        } else {
            header_size += 2;
        };

        if self.stream.len() < header_size {
            return Ok(None);
        }

        let mut offset = 1;
        let raw_type = if flags & PacketFlag::ShortType as u8 != 0 {
            self.stream[offset] as u16
        } else {
            BigEndian::read_u16(&self.stream[offset..offset + 2])
        };
        offset = header_size;

        let packet_type = match PacketType::from_u16(raw_type) {
            Some(packet_type) if packets::has(packet_type) => packet_type,
            _ => return Err(Box::new(ErrorKind::UnknownPacketType(raw_type))),
        };
        let packet_info = packets::get(packet_type);

        let data_size = if let Some(fixed_size) = packet_info.fixed_size {
            fixed_size
        } else {
            if flags & PacketFlag::ShortSize as u8 != 0 {
                header_size += 1;
            } else {
                header_size += 3;
            }
            if self.stream.len() < header_size {
                return Ok(None);
            }
            if flags & PacketFlag::ShortSize as u8 != 0 {
                self.stream[offset] as usize
            } else {
                BigEndian::read_u24(&self.stream[offset..offset + 3]) as usize
            }
        };

        // Done
        if self.stream.len() < header_size + data_size {
            return Ok(None);
        }

        let header = self.stream.split_to(header_size);
        let data = self.stream.split_to(data_size);

        debug!(
            "Decoded new packet. Header: {:?} (Flags: {}, Type: {:?}, Data Size: {})",
            &header[..],
            flags,
            packet_type,
            data_size
        );
        Ok(Some(Packet::new(packet_type, data.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use crate::net::packet::Packet;
    use crate::net::packet_decoder::PacketDecoder;
    use crate::net::packet_encoder::PacketEncoder;
    use crate::net::packets::PacketType;
    use crate::utils::byte_buffer::ByteBuffer;

    #[test]
    fn single_packet() {
        let mut encoder = PacketEncoder::new(256);
        encoder.add_packet(Packet::new(PacketType::PacketInit, vec![1; 25]));
        let buffer = encoder.next_buffer().unwrap();
        assert_eq!(buffer.len(), 3 + 25);

        let mut decoder = PacketDecoder::new();
        decoder.push_buffer(buffer);
        let packet = decoder.next_packet().unwrap().unwrap();
        assert!(packet.short_type());
        assert!(packet.short_size());
        assert_eq!(packet.packet_type, PacketType::PacketInit);
        assert_eq!(&packet.data[..], &[1; 25]);

        assert!(decoder.next_packet().unwrap().is_none());
    }

    #[test]
    fn multiple_packets() {
        let mut encoder = PacketEncoder::new(256);
        encoder.add_packet(Packet::new(PacketType::PacketInit, vec![1; 25]));
        encoder.add_packet(Packet::new(PacketType::PlayerSat, vec![2; 75]));
        let buffer = encoder.next_buffer().unwrap();
        assert_eq!(buffer.len(), 3 + 25 + 3 + 75);

        let mut decoder = PacketDecoder::new();
        decoder.push_buffer(buffer);
        let packet = decoder.next_packet().unwrap().unwrap();
        assert_eq!(packet.packet_type, PacketType::PacketInit);
        assert_eq!(&packet.data[..], &[1; 25]);

        let packet = decoder.next_packet().unwrap().unwrap();
        assert_eq!(packet.packet_type, PacketType::PlayerSat);
        assert_eq!(&packet.data[..], &vec![2; 75][..]);

        assert!(decoder.next_packet().unwrap().is_none());
    }

    #[test]
    fn long_packet_split_across_reads() {
        let mut encoder = PacketEncoder::new(1024);
        encoder.add_packet(Packet::new(PacketType::GetTablesResponse, vec![7; 300]));
        let buffer = encoder.next_buffer().unwrap();
        assert_eq!(buffer.len(), 5 + 300);

        let mut decoder = PacketDecoder::new();
        let (first, second) = buffer.split_at(4);
        decoder.push_buffer(ByteBuffer::from(first.to_vec()));
        assert!(decoder.next_packet().unwrap().is_none());
        decoder.push_buffer(ByteBuffer::from(second.to_vec()));

        let packet = decoder.next_packet().unwrap().unwrap();
        assert!(!packet.short_size());
        assert_eq!(packet.packet_type, PacketType::GetTablesResponse);
        assert_eq!(packet.data_size(), 300);
    }

    #[test]
    fn rejects_garbage() {
        let mut decoder = PacketDecoder::new();
        decoder.push_buffer(ByteBuffer::from(vec![0x01, 0x02, 0x03]));
        assert!(decoder.next_packet().is_err());

        let mut decoder = PacketDecoder::new();
        decoder.push_buffer(ByteBuffer::from(vec![0xe0, 200, 0]));
        assert!(decoder.next_packet().is_err());
    }
}
