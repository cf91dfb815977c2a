//! Board-level integration tests driving the full Rasterizer/CPU/Audio
//! pipeline through `Request`/`Response`, rather than the bare `I8080`
//! against `TestBus` (see `i8080_cpu_test.rs`).

use vector06c_core::board::Board;
use vector06c_core::device::fdc1793::FDD_SIZE;
use vector06c_core::request::{KeyEventAction, Request, Response};

fn load_program(board: &mut Board, addr: u16, bytes: &[u8]) {
    board.request(Request::SetMem {
        addr,
        data: bytes.to_vec(),
    });
    board.request(Request::SetRegPc(addr));
}

fn run_instructions(board: &mut Board, count: usize) {
    for _ in 0..count {
        board.request(Request::ExecuteInstr);
    }
}

fn reg_a(board: &mut Board) -> u8 {
    match board.request(Request::GetCpuState) {
        Response::CpuState(s) => s.a,
        other => panic!("expected CpuState, got {other:?}"),
    }
}

#[test]
fn reset_puts_pc_at_zero_and_stops_the_machine() {
    let mut board = Board::new();
    board.request(Request::SetRegPc(0x1234));
    board.request(Request::Reset);
    match board.request(Request::GetRegPc) {
        Response::RegPc(pc) => assert_eq!(pc, 0),
        other => panic!("expected RegPc, got {other:?}"),
    }
}

#[test]
fn mvi_executes_through_the_full_board_pipeline() {
    let mut board = Board::new();
    // MVI A, 0x42 ; HLT
    load_program(&mut board, 0, &[0x3E, 0x42, 0x76]);
    run_instructions(&mut board, 1);
    assert_eq!(reg_a(&mut board), 0x42);
}

#[test]
fn conflicting_ram_disk_mappings_latch_a_fault_and_clear_all_mappings() {
    let mut board = Board::new();
    // MVI A,0x20 ; OUT 0x70 ; NOP ; MVI A,0x20 ; OUT 0x71 ; NOP ; HLT
    load_program(
        &mut board,
        0,
        &[
            0x3E, 0x20, 0xD3, 0x70, 0x00, 0x3E, 0x20, 0xD3, 0x71, 0x00, 0x76,
        ],
    );

    // Run past the first OUT and its commit: only disk 0 is mapped in,
    // so no fault yet and it becomes the active disk.
    run_instructions(&mut board, 3);
    match board.request(Request::GetMemoryMapping { disk_index: 0 }) {
        Response::MemoryMapping(m) => assert!(m.mode_ram_a, "disk 0 should be mapped in"),
        other => panic!("expected MemoryMapping, got {other:?}"),
    }

    // Run the second OUT and its commit: disk 1 now also claims a mode,
    // so the board should fault and wipe every mapping back to default.
    run_instructions(&mut board, 3);
    match board.request(Request::GetMemoryMappings) {
        Response::MemoryMappings(all) => {
            for (i, m) in all.iter().enumerate() {
                assert!(!m.mode_ram_a, "mapping {i} should have been cleared by the fault");
                assert_eq!(m.page_ram, 0);
            }
        }
        other => panic!("expected MemoryMappings, got {other:?}"),
    }
}

#[test]
fn mount_and_dismount_round_trips_a_floppy_image() {
    let mut board = Board::new();
    let mut image = vec![0u8; FDD_SIZE];
    image[0] = 0xAB;
    image[FDD_SIZE - 1] = 0xCD;

    let resp = board.request(Request::MountFdd {
        drive: 0,
        image: image.clone(),
    });
    assert!(matches!(resp, Response::Ok));

    match board.request(Request::DismountFdd { drive: 0 }) {
        Response::FddImage(data) => assert_eq!(data, image),
        other => panic!("expected FddImage, got {other:?}"),
    }
}

#[test]
fn mount_with_oversized_image_reports_a_truncation_warning() {
    let mut board = Board::new();
    let image = vec![0u8; FDD_SIZE + 1024];
    match board.request(Request::MountFdd { drive: 0, image }) {
        Response::Error(msg) => assert!(msg.contains("truncat") || msg.contains("Truncat")),
        other => panic!("expected a truncation warning, got {other:?}"),
    }
}

#[test]
fn fdc_read_sector_delivers_the_mounted_bytes_through_io_ports() {
    let mut board = Board::new();
    let mut image = vec![0u8; FDD_SIZE];
    // side 1, track 0, sector 1 (the drive's power-on defaults) starts at
    // byte offset 5 * 1024 in the CHS-flattened image.
    let marker_offset = 5 * 1024;
    image[marker_offset] = 0xAB;
    board.request(Request::MountFdd { drive: 0, image });

    load_program(
        &mut board,
        0,
        &[
            0x3E, 0x00, // MVI A,0x00
            0xD3, 0x1C, // OUT 0x1C   (system: drive 0, side 1)
            0x00, // NOP (lets the deferred write commit)
            0x3E, 0x80, // MVI A,0x80
            0xD3, 0x18, // OUT 0x18   (command: READ SECTOR)
            0x00, // NOP (lets the deferred write commit)
            0xDB, 0x1B, // IN 0x1B    (read first data byte)
            0x76, // HLT
        ],
    );
    run_instructions(&mut board, 8);
    assert_eq!(reg_a(&mut board), 0xAB);
}

#[test]
fn execute_frame_advances_exactly_one_frame_and_raises_the_vblank_irq() {
    let mut board = Board::new();
    // JMP 0x0000 — spins forever so execute_frame always has work to do.
    load_program(&mut board, 0, &[0xC3, 0x00, 0x00]);

    let starting = match board.request(Request::GetDisplayData) {
        Response::DisplayData(d) => d.frame_num,
        other => panic!("expected DisplayData, got {other:?}"),
    };
    let hit_break = board.execute_frame(false);
    assert!(!hit_break, "no breakpoints armed, should run to frame boundary");
    match board.request(Request::GetDisplayData) {
        Response::DisplayData(d) => assert_eq!(d.frame_num, starting + 1),
        other => panic!("expected DisplayData, got {other:?}"),
    }
}

#[test]
fn breakpoint_on_pc_stops_execute_frame_before_the_next_one_is_reached() {
    let mut board = Board::new();
    // NOP at 0, 1, 2; HLT at 3. Breakpoint fires on reaching pc == 2.
    load_program(&mut board, 0, &[0x00, 0x00, 0x00, 0x76]);

    use vector06c_core::debugger::{Condition, Operand};
    use vector06c_core::request::NewBreakpoint;
    board.request(Request::DebugBreakpointAdd(NewBreakpoint {
        address: 2,
        page_mask: 1,
        auto_delete: false,
        operand: Operand::A,
        condition: Condition::Any,
        value: 0,
        comment: "stop at 2".into(),
    }));

    let hit = board.execute_frame(true);
    assert!(hit, "breakpoint on pc==2 should have stopped the frame early");
    match board.request(Request::GetRegPc) {
        Response::RegPc(pc) => assert_eq!(pc, 2),
        other => panic!("expected RegPc, got {other:?}"),
    }
}

#[test]
fn key_handling_sets_and_clears_the_keyboard_matrix() {
    let mut board = Board::new();
    // Matrix-encoded scancode: row 1, col 2 -> (1 << 3) | 2 == 0x0A.
    let code = 0x0A;
    board.request(Request::KeyHandling {
        scancode: code,
        action: KeyEventAction::Down,
    });
    board.request(Request::KeyHandling {
        scancode: code,
        action: KeyEventAction::Up,
    });
    // No direct host-facing query for individual matrix bits; this mainly
    // guards against a panic/trap in the row/col decode on round trip.
}

#[test]
fn border_fill_toggle_is_accepted_without_disturbing_frame_state() {
    let mut board = Board::new();
    board.request(Request::BorderFill { data: false });
    load_program(&mut board, 0, &[0xC3, 0x00, 0x00]);
    board.execute_frame(false);
    match board.request(Request::GetFrame { vsync: true }) {
        Response::Frame(pixels) => assert_eq!(pixels.len(), 768 * 312),
        other => panic!("expected Frame, got {other:?}"),
    }
}
