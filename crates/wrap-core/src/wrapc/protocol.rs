//! The in-band control protocol carried over the wrapc pipeline's pipes
//! (spec §4.4.2, §6). Every control message starts with the byte [`DLE`]
//! followed by a single code byte, with `NEW_LEADER` carrying an
//! additional `"<width>\x01<leader>\n"` payload line.

/// Data Link Escape, the byte that introduces a control message.
pub const DLE: u8 = 0x10;

/// The unit separator byte splitting `NEW_LEADER`'s width from its leader.
pub const UNIT_SEPARATOR: u8 = 0x01;

/// One control message on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCode {
    /// Force a paragraph break.
    DelimitParagraph,
    /// The leader changed mid-comment.
    NewLeader {
        /// Display width of the new leader, in columns.
        width: usize,
        /// The new leader text.
        leader: String,
    },
    /// Subsequent lines pass through verbatim.
    PreformattedBegin,
    /// End of the verbatim block.
    PreformattedEnd,
    /// End of comment; remaining input is non-comment code.
    WrapEnd,
}

impl ControlCode {
    /// The single code byte identifying this message's kind.
    pub fn code_byte(&self) -> u8 {
        match self {
            ControlCode::DelimitParagraph => 1,
            ControlCode::NewLeader { .. } => 2,
            ControlCode::PreformattedBegin => 3,
            ControlCode::PreformattedEnd => 4,
            ControlCode::WrapEnd => 5,
        }
    }

    /// Decode a code byte plus (for `NEW_LEADER`) its payload line, which
    /// must already have its trailing `\n` stripped.
    pub fn parse(code_byte: u8, payload: &str) -> Option<ControlCode> {
        match code_byte {
            1 => Some(ControlCode::DelimitParagraph),
            2 => {
                let (width_str, leader) = payload.split_once(UNIT_SEPARATOR as char)?;
                let width = width_str.parse().ok()?;
                Some(ControlCode::NewLeader { width, leader: leader.to_string() })
            }
            3 => Some(ControlCode::PreformattedBegin),
            4 => Some(ControlCode::PreformattedEnd),
            5 => Some(ControlCode::WrapEnd),
            _ => None,
        }
    }

    /// Serialize this message onto the wire: `DLE`, the code byte, and
    /// (for `NEW_LEADER`) the payload line.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(DLE);
        out.push(self.code_byte());
        if let ControlCode::NewLeader { width, leader } = self {
            out.extend_from_slice(width.to_string().as_bytes());
            out.push(UNIT_SEPARATOR);
            out.extend_from_slice(leader.as_bytes());
            out.push(b'\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_new_leader() {
        let msg = ControlCode::NewLeader { width: 72, leader: "  // ".to_string() };
        let mut buf = Vec::new();
        msg.encode(&mut buf);
        assert_eq!(buf[0], DLE);
        let code = buf[1];
        let payload = std::str::from_utf8(&buf[2..buf.len() - 1]).unwrap();
        assert_eq!(ControlCode::parse(code, payload), Some(msg));
    }

    #[test]
    fn round_trips_simple_codes() {
        for msg in [
            ControlCode::DelimitParagraph,
            ControlCode::PreformattedBegin,
            ControlCode::PreformattedEnd,
            ControlCode::WrapEnd,
        ] {
            let mut buf = Vec::new();
            msg.encode(&mut buf);
            assert_eq!(ControlCode::parse(buf[1], ""), Some(msg));
        }
    }
}
