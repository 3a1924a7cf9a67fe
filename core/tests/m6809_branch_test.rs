mod common;
use common::{run, setup};

#[test]
fn test_bra_taken() {
    let (mut cpu, mut bus) = setup(&[0x20, 0x02, 0x12, 0x12, 0x12]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 3);
    assert_eq!(cpu.pc, 0x0004);
}

#[test]
fn test_bra_backwards() {
    // BRA * loops on itself
    let (mut cpu, mut bus) = setup(&[0x20, 0xFE]);
    run(&mut cpu, &mut bus, 5);
    assert_eq!(cpu.pc, 0x0000);
}

#[test]
fn test_short_branch_costs_three_either_way() {
    // LDA #$01 (Z clear), BEQ +5 not taken, BNE +2 taken
    let (mut cpu, mut bus) = setup(&[0x86, 0x01, 0x27, 0x05, 0x26, 0x02]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(run(&mut cpu, &mut bus, 1), 3);
    assert_eq!(cpu.pc, 0x0004);
    assert_eq!(run(&mut cpu, &mut bus, 1), 3);
    assert_eq!(cpu.pc, 0x0008);
}

#[test]
fn test_brn_never_branches() {
    let (mut cpu, mut bus) = setup(&[0x21, 0x10, 0x10, 0x21, 0x00, 0x10]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 3);
    assert_eq!(cpu.pc, 0x0002);
    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc, 0x0006);
}

#[test]
fn test_signed_and_unsigned_conditions() {
    // LDA #$01, CMPA #$02, BLT +2
    let (mut cpu, mut bus) = setup(&[0x86, 0x01, 0x81, 0x02, 0x2D, 0x02]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.pc, 0x0008);

    // LDA #$FF, CMPA #$01, BHI +2 (unsigned 255 > 1)
    let (mut cpu, mut bus) = setup(&[0x86, 0xFF, 0x81, 0x01, 0x22, 0x02]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.pc, 0x0008);

    // LDA #$FF, CMPA #$01, BGT +2 not taken (signed -1 < 1)
    let (mut cpu, mut bus) = setup(&[0x86, 0xFF, 0x81, 0x01, 0x2E, 0x02]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.pc, 0x0006);
}

#[test]
fn test_lbra() {
    let (mut cpu, mut bus) = setup(&[0x16, 0x01, 0x00]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc, 0x0103);
}

#[test]
fn test_long_conditional_taken_costs_one_more() {
    // CLRA, LBEQ +$10
    let (mut cpu, mut bus) = setup(&[0x4F, 0x10, 0x27, 0x00, 0x10]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(run(&mut cpu, &mut bus, 1), 6);
    assert_eq!(cpu.pc, 0x0015);

    // LDA #$01, LBEQ +$10 not taken
    let (mut cpu, mut bus) = setup(&[0x86, 0x01, 0x10, 0x27, 0x00, 0x10]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc, 0x0006);
}

#[test]
fn test_page2_lbra_alias() {
    let (mut cpu, mut bus) = setup(&[0x10, 0x20, 0x00, 0x10]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 6);
    assert_eq!(cpu.pc, 0x0014);
    assert!(cpu.last_fault().is_none());
}

#[test]
fn test_bsr_rts() {
    // LDS #$1000, BSR +3, NOP, NOP, NOP, RTS
    let (mut cpu, mut bus) = setup(&[0x10, 0xCE, 0x10, 0x00, 0x8D, 0x03, 0x12, 0x12, 0x12, 0x39]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(run(&mut cpu, &mut bus, 1), 7);
    assert_eq!(cpu.pc, 0x0009);
    assert_eq!(cpu.s, 0x0FFE);
    assert_eq!(&bus.memory[0x0FFE..0x1000], &[0x00, 0x06]);

    assert_eq!(run(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc, 0x0006);
    assert_eq!(cpu.s, 0x1000);
}

#[test]
fn test_lbsr() {
    let (mut cpu, mut bus) = setup(&[0x17, 0x00, 0x10]);
    cpu.s = 0x1000;
    assert_eq!(run(&mut cpu, &mut bus, 1), 9);
    assert_eq!(cpu.pc, 0x0013);
    assert_eq!(&bus.memory[0x0FFE..0x1000], &[0x00, 0x03]);
}

#[test]
fn test_jsr_modes() {
    // JSR $2000
    let (mut cpu, mut bus) = setup(&[0xBD, 0x20, 0x00]);
    cpu.s = 0x1000;
    assert_eq!(run(&mut cpu, &mut bus, 1), 8);
    assert_eq!(cpu.pc, 0x2000);
    assert_eq!(&bus.memory[0x0FFE..0x1000], &[0x00, 0x03]);

    // JSR ,X
    let (mut cpu, mut bus) = setup(&[0xAD, 0x84]);
    cpu.s = 0x1000;
    cpu.x = 0x3000;
    assert_eq!(run(&mut cpu, &mut bus, 1), 7);
    assert_eq!(cpu.pc, 0x3000);

    // JSR <$40 with DP = $12
    let (mut cpu, mut bus) = setup(&[0x9D, 0x40]);
    cpu.s = 0x1000;
    cpu.dp = 0x12;
    assert_eq!(run(&mut cpu, &mut bus, 1), 7);
    assert_eq!(cpu.pc, 0x1240);
}

#[test]
fn test_jmp_modes() {
    let (mut cpu, mut bus) = setup(&[0x7E, 0x40, 0x00]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 4);
    assert_eq!(cpu.pc, 0x4000);

    let (mut cpu, mut bus) = setup(&[0x0E, 0x80]);
    cpu.dp = 0x01;
    assert_eq!(run(&mut cpu, &mut bus, 1), 3);
    assert_eq!(cpu.pc, 0x0180);
}
