#![allow(dead_code)]

use beamline_machines::vectrex::{BIOS_SIZE, BANK_SIZE, Vectrex};

/// A zero-filled BIOS with the reset vector pointing at cartridge 0x0000 and
/// the IRQ vector at `irq`.
pub fn bios_with_vectors(irq: u16) -> Vec<u8> {
    let mut bios = vec![0u8; BIOS_SIZE];
    bios[0x1FF8..0x1FFA].copy_from_slice(&irq.to_be_bytes());
    bios[0x1FFE..0x2000].copy_from_slice(&0x0000u16.to_be_bytes());
    bios
}

/// Place `code` at `addr` in a 32 KB cartridge image.
pub fn cart_with(code: &[(u16, &[u8])]) -> Vec<u8> {
    let mut cart = vec![0x12u8; 0x8000]; // NOP fill
    for (addr, bytes) in code {
        let start = *addr as usize;
        cart[start..start + bytes.len()].copy_from_slice(bytes);
    }
    cart
}

/// An image of `banks` banks whose bytes depend on their file offset, so a
/// read from the wrong bank or offset shows up.
pub fn banked_image(banks: usize) -> Vec<u8> {
    (0..banks * BANK_SIZE).map(|i| (i ^ (i >> 8) ^ (i >> 14)) as u8).collect()
}

/// Powered-on machine running `cart` with the IRQ vector at `irq`.
pub fn machine(cart: &[u8], irq: u16) -> Vectrex {
    let mut sys = Vectrex::new();
    sys.load_bios(&bios_with_vectors(irq));
    sys.load_program(cart);
    sys.reset();
    sys
}

/// LDS #$CBFF, JSR $0010, NOP, BRA *; the routine at 0x0010 is NOP NOP RTS.
pub fn call_program() -> Vec<u8> {
    cart_with(&[
        (0x0000, &[0x10, 0xCE, 0xCB, 0xFF]),
        (0x0004, &[0xBD, 0x00, 0x10]),
        (0x0007, &[0x12]),
        (0x0008, &[0x20, 0xFE]),
        (0x0010, &[0x12, 0x12, 0x39]),
    ])
}
