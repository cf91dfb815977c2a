use vector06c_core::core::{BusMaster, BusMasterComponent};
use vector06c_core::cpu::i8080::I8080;
mod common;
use common::TestBus;

fn run_until_boundary(cpu: &mut I8080, bus: &mut TestBus) {
    loop {
        if cpu.tick_with_bus(bus, BusMaster::Cpu(0)) {
            break;
        }
    }
}

#[test]
fn mvi_a_loads_immediate_and_advances_pc() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x3E, 0x42]); // MVI A, 0x42
    run_until_boundary(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 2);
}

#[test]
fn every_opcode_consumes_published_cycle_count() {
    // spec.md §8: after get_instr_cycles(op)/4 machine cycles, mc returns
    // to 0. Spot-check a representative opcode from each byte-length class.
    let cases: &[(&[u8], u64)] = &[
        (&[0x00], 4),             // NOP
        (&[0x47], 4),             // MOV B,A
        (&[0x3E, 0x01], 8),       // MVI A,d8
        (&[0x21, 0x34, 0x12], 12), // LXI H,0x1234
        (&[0xCD, 0x00, 0x10], 20), // CALL 0x1000 (taken unconditionally)
        (&[0xC9], 12),            // RET
    ];
    for (bytes, expected_cycles) in cases {
        let mut cpu = I8080::new();
        let mut bus = TestBus::new();
        bus.load(0, bytes);
        // RET needs a return address on the stack to pop.
        if bytes[0] == 0xC9 {
            cpu.sp = 0x2000;
            bus.load(0x2000, &[0x00, 0x30]);
        }
        let before = cpu.cc;
        run_until_boundary(&mut cpu, &mut bus);
        assert_eq!(cpu.cc - before, *expected_cycles, "opcode {:#04x}", bytes[0]);
        assert!(cpu.is_instruction_complete());
    }
}

#[test]
fn daa_worked_example_from_fetch() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x27]); // DAA
    cpu.a = 0x2B;
    run_until_boundary(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x31);
    assert_eq!(cpu.f & 0x01, 0); // carry clear
}

#[test]
fn conditional_call_untaken_skips_push_but_consumes_operand() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xC4, 0x00, 0x10]); // CNZ 0x1000
    cpu.sp = 0x2000;
    cpu.f |= 0x40; // Z set, so NZ is false: branch not taken
    let sp_before = cpu.sp;
    run_until_boundary(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 3); // fell through to the next instruction
    assert_eq!(cpu.sp, sp_before); // push phase was skipped
}

#[test]
fn conditional_return_untaken_completes_in_a_single_machine_cycle() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xC0]); // RNZ
    cpu.f |= 0x40; // Z set: NZ false, untaken
    cpu.sp = 0x2000;
    let before = cpu.cc;
    run_until_boundary(&mut cpu, &mut bus);
    assert_eq!(cpu.cc - before, 4);
    assert_eq!(cpu.pc, 1);
    assert_eq!(cpu.sp, 0x2000); // nothing popped
}

#[test]
fn push_pop_round_trips_register_pair() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xC5, 0xD1]); // PUSH B ; POP D
    cpu.sp = 0x2000;
    cpu.set_bc(0xBEEF);
    run_until_boundary(&mut cpu, &mut bus); // PUSH B
    run_until_boundary(&mut cpu, &mut bus); // POP D
    assert_eq!(cpu.get_de(), 0xBEEF);
    assert_eq!(cpu.sp, 0x2000);
}

#[test]
fn halt_loops_in_place_until_interrupt_arrives() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x76]); // HLT
    run_until_boundary(&mut cpu, &mut bus);
    assert!(cpu.is_sleeping());
    assert_eq!(cpu.pc, 0);
    for _ in 0..5 {
        run_until_boundary(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0);
    }
}

#[test]
fn step_over_resolves_conditional_jump_target() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xCA, 0x00, 0x20]); // JZ 0x2000
    cpu.f |= 0x40; // Z set, taken
    let target = cpu.resolve_step_over(&mut bus, BusMaster::Cpu(0));
    assert_eq!(target, 0x2000);

    cpu.f &= !0x40; // Z clear, not taken
    let fallthrough = cpu.resolve_step_over(&mut bus, BusMaster::Cpu(0));
    assert_eq!(fallthrough, 3);
}
