use byteorder::LittleEndian;

use crate::io::{Buf, BufExt};
use crate::protocol::Capabilities;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_handshake_response.html
// https://mariadb.com/kb/en/connection/#handshake-response-packet
//
// The first client packet after the greeting. Its shape is governed by the
// capability field it itself carries, so decoding starts before any
// negotiation has settled.
#[derive(Debug)]
pub struct HandshakeResponse {
    pub capabilities: Capabilities,
    pub max_packet_size: u32,
    pub collation: u8,
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
    /// Raw client plugin name; may be one this server never drives.
    pub auth_plugin: Option<String>,
    pub connect_attrs: Vec<(String, String)>,
}

impl HandshakeResponse {
    pub(crate) fn decode(mut buf: &[u8]) -> crate::Result<Self> {
        // capability_flags_1 : int<2>
        let capabilities_1 = buf.get_u16::<LittleEndian>()?;
        let mut capabilities = Capabilities::from_bits_truncate(capabilities_1.into());

        if !capabilities.contains(Capabilities::PROTOCOL_41) {
            // Pre-4.1 response: int<3> max packet size, username, auth.
            // Decoded far enough for the connection to reject it politely.
            let max_packet_size = buf.get_u24::<LittleEndian>()?;
            let username = buf.get_str_nul()?.to_owned();

            return Ok(Self {
                capabilities,
                max_packet_size,
                collation: 0,
                username,
                auth_response: buf.to_vec(),
                database: None,
                auth_plugin: None,
                connect_attrs: Vec::new(),
            });
        }

        // capability_flags_2 : int<2>
        let capabilities_2 = buf.get_u16::<LittleEndian>()?;
        capabilities |= Capabilities::from_bits_truncate(u64::from(capabilities_2) << 16);

        // max packet size : int<4>
        let max_packet_size = buf.get_u32::<LittleEndian>()?;

        // client collation : int<1>
        let collation = buf.get_u8()?;

        // reserved : string<23>
        buf.advance(23)?;

        // username : string<NUL>
        let username = buf.get_str_nul()?.to_owned();

        let auth_response = if capabilities.contains(Capabilities::PLUGIN_AUTH_LENENC_DATA) {
            // auth response : string<lenenc>
            buf.get_bytes_lenenc::<LittleEndian>()?.unwrap_or_default().to_vec()
        } else if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            // auth response length : int<1>, auth response : string<n>
            let len = buf.get_u8()?;
            buf.get_bytes(len as usize)?.to_vec()
        } else {
            // auth response : string<NUL>
            buf.get_str_nul()?.as_bytes().to_vec()
        };

        let database = if capabilities.contains(Capabilities::CONNECT_WITH_DB) && !buf.is_empty() {
            // database : string<NUL>
            Some(buf.get_str_nul()?.to_owned())
        } else {
            None
        };

        let auth_plugin = if capabilities.contains(Capabilities::PLUGIN_AUTH) && !buf.is_empty() {
            // client plugin name : string<NUL>
            Some(buf.get_str_nul()?.to_owned())
        } else {
            None
        };

        let mut connect_attrs = Vec::new();

        if capabilities.contains(Capabilities::CONNECT_ATTRS) && !buf.is_empty() {
            // total length : int<lenenc>, then (key, value) lenenc string pairs
            let total = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0) as usize;
            let mut attrs = buf.get_bytes(total.min(buf.len()))?;

            while !attrs.is_empty() {
                let key = attrs.get_str_lenenc::<LittleEndian>()?.unwrap_or_default();
                let value = attrs.get_str_lenenc::<LittleEndian>()?.unwrap_or_default();

                connect_attrs.push((key.to_owned(), value.to_owned()));
            }
        }

        Ok(Self {
            capabilities,
            max_packet_size,
            collation,
            username,
            auth_response,
            database,
            auth_plugin,
            connect_attrs,
        })
    }
}
