mod common;

use beamline_core::core::machine::Machine;
use beamline_core::device::integrator::{ALG_MAX_X, ALG_MAX_Y, FCYCLES_INIT};
use beamline_machines::registry;
use beamline_machines::rom_loader::RomSet;
use beamline_machines::vectrex::{BIOS_FILE, BIOS_SIZE, CART_FILE, INPUT_BUTTON_1, INPUT_LEFT, Vectrex};
use common::*;

// =================================================================
// Power-on and execution
// =================================================================

#[test]
fn test_uninitialized_accessors_return_defaults() {
    let sys = Vectrex::new();
    assert!(!sys.is_initialized());
    assert_eq!(sys.registers().pc, 0);
    assert_eq!(sys.metrics().cycles, 0);
    assert!(sys.segments().is_empty());
}

#[test]
fn test_reset_loads_vector_and_clears_cycles() {
    let mut sys = machine(&call_program(), 0x0100);
    assert!(sys.is_initialized());
    let regs = sys.registers();
    assert_eq!(regs.pc, 0x0000);
    assert_eq!(regs.dp, 0);
    assert_eq!(regs.cc & 0x50, 0x50); // I and F masked
    assert_eq!(regs.cycles, 0);

    sys.step();
    assert_eq!(sys.registers().s, 0xCBFF);
    assert_eq!(sys.registers().cycles, 4); // LDS #
}

#[test]
fn test_zero_bios_program_runs_a_frame_without_fault() {
    // JMP $F000 into an all-zero BIOS: NEG <$00 repeated, wrapping back to 0
    let mut sys = Vectrex::new();
    sys.load_bios(&vec![0u8; BIOS_SIZE]);
    sys.load_program(&[0x7E, 0xF0, 0x00]);
    sys.reset();
    assert_eq!(sys.registers().pc, 0x0000);

    sys.step();
    assert_eq!(sys.registers().pc, 0xF000);
    assert!(sys.metrics().last_fault.is_none());

    let executed = sys.run_frame();
    assert!(executed >= FCYCLES_INIT as u64);
    sys.run_frame();

    let metrics = sys.metrics();
    assert!(metrics.last_fault.is_none());
    assert!(metrics.frames >= 1);
    assert!(metrics.instructions > 0);
    assert_eq!(metrics.cycles, sys.registers().cycles);
}

#[test]
fn test_undefined_opcode_is_recorded_and_execution_continues() {
    let mut sys = machine(&cart_with(&[(0x0000, &[0x01, 0x12])]), 0x0000);
    assert_eq!(sys.step(), 2);
    let fault = sys.metrics().last_fault.expect("fault recorded");
    assert_eq!(fault.pc, 0x0000);
    assert_eq!(fault.opcode, 0x01);
    assert_eq!(fault.page, 1);
    assert_eq!(sys.registers().pc, 0x0001);
    sys.step();
    assert_eq!(sys.registers().pc, 0x0002);
}

#[test]
fn test_via_timer_interrupt_reaches_cpu() {
    let cart = cart_with(&[
        (0x0000, &[0x10, 0xCE, 0xCB, 0xFF]), // LDS #$CBFF
        (0x0004, &[0x86, 0xC0]),             // LDA #$C0
        (0x0006, &[0xB7, 0xD0, 0x0E]),       // STA IER (enable T1)
        (0x0009, &[0x86, 0x10]),             // LDA #$10
        (0x000B, &[0xB7, 0xD0, 0x04]),       // STA T1L
        (0x000E, &[0x4F]),                   // CLRA
        (0x000F, &[0xB7, 0xD0, 0x05]),       // STA T1H (start)
        (0x0012, &[0x1C, 0xEF]),             // ANDCC #$EF
        (0x0014, &[0x20, 0xFE]),             // BRA *
        (0x0100, &[0x20, 0xFE]),             // handler: BRA *
    ]);
    let mut sys = machine(&cart, 0x0100);
    for _ in 0..200 {
        sys.step();
    }

    let metrics = sys.metrics();
    assert_eq!(metrics.interrupts, 1);
    assert!(metrics.irq_line);
    assert_eq!(metrics.via_ier, 0x40);
    assert_eq!(sys.registers().pc, 0x0100);
    // Entire state stacked, I masked again
    assert_eq!(sys.registers().s, 0xCBFF - 12);
    assert_ne!(sys.registers().cc & 0x10, 0);
}

#[test]
fn test_ram_is_seeded_and_writable_through_bus() {
    let mut sys = machine(&call_program(), 0x0000);
    assert_eq!(sys.peek(0xC805), 0x05);
    sys.poke(0xC805, 0xA5);
    assert_eq!(sys.peek(0xC805), 0xA5);
    assert_eq!(sys.peek(0xCC05), 0xA5); // mirror

    sys.reset();
    assert_eq!(sys.peek(0xC805), 0x05);
}

#[test]
fn test_cartridge_and_bios_are_read_only() {
    let mut sys = machine(&call_program(), 0x0000);
    sys.poke(0x0000, 0x55);
    assert_eq!(sys.peek(0x0000), 0x10);
    sys.poke(0xFFFF, 0x55);
    assert_eq!(sys.peek(0xFFFF), 0x00);
    assert_eq!(sys.peek(0x9000), 0xFF); // unmapped
}

// =================================================================
// Machine trait / registry
// =================================================================

#[test]
fn test_machine_trait_surface() {
    let mut sys = machine(&call_program(), 0x0000);
    assert_eq!(sys.display_extent(), (ALG_MAX_X, ALG_MAX_Y));
    assert_eq!(sys.input_map().len(), 8);
    for button in sys.input_map() {
        assert!(!button.name.is_empty());
    }
    assert!(sys.frame_vectors().is_empty());

    sys.set_input(INPUT_BUTTON_1, true);
    assert_eq!(sys.board().psg().register(14) & 0x01, 0);
    sys.set_input(INPUT_BUTTON_1, false);
    assert_eq!(sys.board().psg().register(14) & 0x01, 0x01);

    sys.set_input(INPUT_LEFT, true);
    assert_eq!(sys.board().dac().pot(0), 0x00);
    sys.set_input(INPUT_LEFT, false);
    assert_eq!(sys.board().dac().pot(0), 0x80);
}

#[test]
fn test_registry_builds_from_rom_set() {
    let mut roms = RomSet::default();
    roms.insert(BIOS_FILE, bios_with_vectors(0x0000));
    roms.insert(CART_FILE, call_program());

    let entry = registry::find("vectrex").expect("registered");
    let mut machine = (entry.create)(&roms).expect("machine created");
    assert!(machine.run_frame() > 0);
}

#[test]
fn test_registry_requires_bios() {
    let roms = RomSet::default();
    assert!(Vectrex::from_rom_set(&roms).is_err());
}
