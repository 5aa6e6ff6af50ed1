//! Opcode constants used by the standard templates and by signature hashing.

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = OP_0;
pub const OP_DATA_1: u8 = 0x01;
pub const OP_DATA_20: u8 = 0x14;
pub const OP_DATA_33: u8 = 0x21;
pub const OP_DATA_75: u8 = 0x4b;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = OP_1;
pub const OP_16: u8 = 0x60;
pub const OP_NOP: u8 = 0x61;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb2;

/// Canonical name of an opcode for ASM output.
///
/// Direct pushes render as `OP_DATA_n`, small integers as `OP_n`, and
/// anything without a name here as `OP_UNKNOWN<byte>`.
pub fn opcode_to_string(op: u8) -> String {
    let name = match op {
        OP_0 => "OP_0",
        OP_PUSHDATA1 => "OP_PUSHDATA1",
        OP_PUSHDATA2 => "OP_PUSHDATA2",
        OP_PUSHDATA4 => "OP_PUSHDATA4",
        OP_1NEGATE => "OP_1NEGATE",
        OP_NOP => "OP_NOP",
        OP_IF => "OP_IF",
        OP_NOTIF => "OP_NOTIF",
        OP_ELSE => "OP_ELSE",
        OP_ENDIF => "OP_ENDIF",
        OP_VERIFY => "OP_VERIFY",
        OP_RETURN => "OP_RETURN",
        OP_DROP => "OP_DROP",
        OP_DUP => "OP_DUP",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_RIPEMD160 => "OP_RIPEMD160",
        OP_SHA256 => "OP_SHA256",
        OP_HASH160 => "OP_HASH160",
        OP_HASH256 => "OP_HASH256",
        OP_CODESEPARATOR => "OP_CODESEPARATOR",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
        OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
        OP_CHECKMULTISIGVERIFY => "OP_CHECKMULTISIGVERIFY",
        OP_CHECKLOCKTIMEVERIFY => "OP_CHECKLOCKTIMEVERIFY",
        OP_CHECKSEQUENCEVERIFY => "OP_CHECKSEQUENCEVERIFY",
        OP_DATA_1..=OP_DATA_75 => return format!("OP_DATA_{}", op),
        OP_1..=OP_16 => return format!("OP_{}", op - OP_1 + 1),
        _ => return format!("OP_UNKNOWN{}", op),
    };
    name.to_string()
}

/// Parse an ASM opcode name back into its byte.
pub fn string_to_opcode(name: &str) -> Option<u8> {
    if let Some(n) = name.strip_prefix("OP_DATA_") {
        return n.parse::<u8>().ok().filter(|v| (OP_DATA_1..=OP_DATA_75).contains(v));
    }
    let small = name
        .strip_prefix("OP_")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|v| (1..=16).contains(v));
    if let Some(n) = small {
        return Some(OP_1 + n - 1);
    }
    (0..=u8::MAX).find(|op| {
        !(OP_DATA_1..=OP_DATA_75).contains(op)
            && !(OP_1..=OP_16).contains(op)
            && opcode_to_string(*op) == name
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(opcode_to_string(OP_CODESEPARATOR), "OP_CODESEPARATOR");
        assert_eq!(opcode_to_string(OP_DATA_20), "OP_DATA_20");
        assert_eq!(opcode_to_string(OP_16), "OP_16");
        assert_eq!(opcode_to_string(0xff), "OP_UNKNOWN255");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(string_to_opcode("OP_DUP"), Some(OP_DUP));
        assert_eq!(string_to_opcode("OP_DATA_33"), Some(OP_DATA_33));
        assert_eq!(string_to_opcode("OP_1"), Some(OP_1));
        assert_eq!(string_to_opcode("OP_0"), Some(OP_0));
        assert_eq!(string_to_opcode("OP_BOGUS"), None);
        assert_eq!(string_to_opcode("OP_DATA_76"), None);
    }
}
