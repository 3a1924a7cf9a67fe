//! Base cycle counts from the MC6809 datasheet.
//!
//! Counts include the opcode fetch (and the prefix byte for pages 2 and 3).
//! Indexed addressing, PSH/PUL register lists, RTI with E set and taken long
//! branches add cycles on top of these at execution time.

/// Page-1 base cycles. Zero marks an undefined opcode.
#[rustfmt::skip]
const PAGE1: [u8; 256] = [
    //  0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
        6,  0,  0,  6,  6,  0,  6,  6,  6,  6,  6,  0,  6,  6,  3,  6, // 0x00
        0,  0,  2,  2,  0,  0,  5,  9,  0,  2,  3,  0,  3,  2,  8,  6, // 0x10
        3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3,  3, // 0x20
        4,  4,  4,  4,  5,  5,  5,  5,  0,  5,  3,  6, 20, 11,  0, 19, // 0x30
        2,  0,  0,  2,  2,  0,  2,  2,  2,  2,  2,  0,  2,  2,  0,  2, // 0x40
        2,  0,  0,  2,  2,  0,  2,  2,  2,  2,  2,  0,  2,  2,  0,  2, // 0x50
        6,  0,  0,  6,  6,  0,  6,  6,  6,  6,  6,  0,  6,  6,  3,  6, // 0x60
        7,  0,  0,  7,  7,  0,  7,  7,  7,  7,  7,  0,  7,  7,  4,  7, // 0x70
        2,  2,  2,  4,  2,  2,  2,  0,  2,  2,  2,  2,  4,  7,  3,  0, // 0x80
        4,  4,  4,  6,  4,  4,  4,  4,  4,  4,  4,  4,  6,  7,  5,  5, // 0x90
        4,  4,  4,  6,  4,  4,  4,  4,  4,  4,  4,  4,  6,  7,  5,  5, // 0xA0
        5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  5,  7,  8,  6,  6, // 0xB0
        2,  2,  2,  4,  2,  2,  2,  0,  2,  2,  2,  2,  3,  0,  3,  0, // 0xC0
        4,  4,  4,  6,  4,  4,  4,  4,  4,  4,  4,  4,  5,  5,  5,  5, // 0xD0
        4,  4,  4,  6,  4,  4,  4,  4,  4,  4,  4,  4,  5,  5,  5,  5, // 0xE0
        5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  5,  6,  6,  6,  6, // 0xF0
];

/// Base cycles for an unprefixed opcode, or 0 if it is undefined.
pub const fn page1_cycles(opcode: u8) -> u32 {
    PAGE1[opcode as usize] as u32
}

/// Base cycles for a 0x10-prefixed opcode, or 0 if it is undefined.
pub const fn page2_cycles(opcode: u8) -> u32 {
    match opcode {
        0x20..=0x2F => 5,
        0x3F => 20,
        0x83 | 0x8C => 5,
        0x8E | 0xCE => 4,
        0x93 | 0x9C => 7,
        0x9E | 0x9F | 0xDE | 0xDF => 6,
        0xA3 | 0xAC => 7,
        0xAE | 0xAF | 0xEE | 0xEF => 6,
        0xB3 | 0xBC => 8,
        0xBE | 0xBF | 0xFE | 0xFF => 7,
        _ => 0,
    }
}

/// Base cycles for a 0x11-prefixed opcode, or 0 if it is undefined.
pub const fn page3_cycles(opcode: u8) -> u32 {
    match opcode {
        0x3F => 20,
        0x83 | 0x8C => 5,
        0x93 | 0x9C | 0xA3 | 0xAC => 7,
        0xB3 | 0xBC => 8,
        _ => 0,
    }
}
