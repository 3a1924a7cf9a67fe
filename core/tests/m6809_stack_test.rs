mod common;
use common::{run, setup};

#[test]
fn test_pshs_order_and_cycles() {
    // PSHS A,B,X
    let (mut cpu, mut bus) = setup(&[0x34, 0x16]);
    cpu.s = 0x1000;
    cpu.a = 0x11;
    cpu.b = 0x22;
    cpu.x = 0x3344;
    assert_eq!(run(&mut cpu, &mut bus, 1), 9);
    assert_eq!(cpu.s, 0x0FFC);
    assert_eq!(&bus.memory[0x0FFC..0x1000], &[0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn test_push_and_pull_everything() {
    // PSHS all, then PULS all restores the same state
    let (mut cpu, mut bus) = setup(&[0x34, 0xFF, 0x35, 0xFF]);
    cpu.s = 0x1000;
    cpu.a = 0x01;
    cpu.b = 0x02;
    cpu.dp = 0x03;
    cpu.x = 0x0405;
    cpu.y = 0x0607;
    cpu.u = 0x0809;
    cpu.cc = 0x0A;
    assert_eq!(run(&mut cpu, &mut bus, 1), 17);
    assert_eq!(cpu.s, 0x1000 - 12);
    // PC pushed is the address after PSHS
    assert_eq!(&bus.memory[0x0FFE..0x1000], &[0x00, 0x02]);

    cpu.a = 0;
    cpu.x = 0;
    cpu.u = 0;
    cpu.cc = 0;
    assert_eq!(run(&mut cpu, &mut bus, 1), 17);
    assert_eq!(cpu.s, 0x1000);
    assert_eq!((cpu.a, cpu.b, cpu.dp), (0x01, 0x02, 0x03));
    assert_eq!((cpu.x, cpu.y, cpu.u), (0x0405, 0x0607, 0x0809));
    assert_eq!(cpu.cc, 0x0A);
    // PULS PC sent us back to the PULS
    assert_eq!(cpu.pc, 0x0002);
}

#[test]
fn test_puls_pc_returns() {
    let (mut cpu, mut bus) = setup(&[0x35, 0x80]);
    cpu.s = 0x0FFE;
    bus.load(0x0FFE, &[0x12, 0x34]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 7);
    assert_eq!(cpu.pc, 0x1234);
    assert_eq!(cpu.s, 0x1000);
}

#[test]
fn test_user_stack_pushes_system_pointer() {
    // PSHU S, then PULU A
    let (mut cpu, mut bus) = setup(&[0x36, 0x40, 0x36, 0x02]);
    cpu.u = 0x2000;
    cpu.s = 0xABCD;
    cpu.a = 0x5A;
    assert_eq!(run(&mut cpu, &mut bus, 1), 7);
    assert_eq!(cpu.u, 0x1FFE);
    assert_eq!(&bus.memory[0x1FFE..0x2000], &[0xAB, 0xCD]);
    assert_eq!(cpu.s, 0xABCD);

    assert_eq!(run(&mut cpu, &mut bus, 1), 6);
    assert_eq!(bus.memory[0x1FFD], 0x5A);
}

#[test]
fn test_pulu_into_s() {
    let (mut cpu, mut bus) = setup(&[0x37, 0x40]);
    cpu.u = 0x2000;
    bus.load(0x2000, &[0x0C, 0x00]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.s, 0x0C00);
    assert_eq!(cpu.u, 0x2002);
}
