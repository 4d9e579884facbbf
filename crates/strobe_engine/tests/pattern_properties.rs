//! End-to-end properties of the pin/cycle engine, exercised through the
//! public API the way a pattern script would use it.

use strobe_engine::{
    library, DataPort, DeclaredDut, Drivable, EngineError, Op, Pattern, PatternComparison, Pin,
    PinDecl, PinSet, PortMap, RecordKind, Session, SimpleDut, Tester,
};

const VALUES: [u64; 6] = [0x00, 0xFF, 0xAA, 0x55, 0x0F, 0xF0];

fn run_script<F>(name: &str, script: F) -> Pattern
where
    F: FnOnce(&mut Session<'_, SimpleDut>) -> Result<(), EngineError>,
{
    let mut dut = SimpleDut::new().unwrap();
    let mut tester = Tester::new();
    let mut session = Session::new(name, &mut dut, &mut tester);
    script(&mut session).unwrap();
    session.finish()
}

// ---------------------------------------------------------------------------
// Pin state and the cycle clock
// ---------------------------------------------------------------------------

#[test]
fn committed_state_always_fits_width() {
    for width in [1u32, 3, 8, 13, 32, 64] {
        let mut pin = Pin::new(&PinDecl::new("p").with_width(width)).unwrap();
        for value in [0u64, 1, 0x7F, 0x1234_5678, i64::MAX as u64, u64::MAX] {
            pin.drive(i128::from(value)).unwrap();
            pin.commit();
            let state = pin.current_state();
            assert_eq!(state, value & pin.mask());
            if width < 64 {
                assert!(state < 1u64 << width, "width {width} value {value:#x}");
            }
        }
    }
}

#[test]
fn commit_without_drive_is_idempotent() {
    let mut set = PinSet::from_decls(&SimpleDut::pin_table()).unwrap();
    set.get_mut("data").unwrap().drive(0xC3).unwrap();
    set.commit_all();
    for _ in 0..5 {
        set.commit_all();
        assert_eq!(set.get("data").unwrap().current_state(), 0xC3);
    }
}

#[test]
fn cycle_count_equals_number_of_cycles() {
    let mut set = PinSet::from_decls(&SimpleDut::pin_table()).unwrap();
    let mut tester = Tester::new();
    let mut last = tester.cycle_count();
    for _ in 0..100 {
        tester.cycle(&mut set);
        assert_eq!(tester.cycle_count(), last + 1);
        last = tester.cycle_count();
    }
    assert_eq!(tester.cycle_count(), 100);
}

#[test]
fn undriven_pin_holds_across_cycles() {
    let pat = run_script("hold", |s| {
        s.drive("reset", 1)?;
        s.cycle();
        s.drive("clk", 1)?;
        s.cycles(3);
        Ok(())
    });
    assert_eq!(pat.final_state("reset"), Some(1));
    assert_eq!(pat.final_state("clk"), Some(1));
}

// ---------------------------------------------------------------------------
// Composite operations
// ---------------------------------------------------------------------------

#[test]
fn write_then_read_roundtrip_has_no_failures() {
    for v in VALUES {
        let pat = run_script("roundtrip", |s| {
            s.write_data(v)?;
            s.read_data(v)?;
            Ok(())
        });
        assert_eq!(pat.failure_count(), 0, "value {v:#04x}");
        assert_eq!(pat.assertion_count(), 1);
    }
}

#[test]
fn reset_device_always_takes_six_cycles() {
    for preamble in [0u64, 1, 7] {
        let pat = run_script("reset", |s| {
            s.drive("reset", 1)?;
            s.drive("data", 0x99)?;
            s.cycles(preamble);
            let before = s.cycle_count();
            s.reset_device()?;
            assert_eq!(s.cycle_count() - before, 6);
            Ok(())
        });
        assert_eq!(pat.final_state("reset"), Some(0));
    }
}

#[test]
fn mismatched_read_records_one_failure() {
    for v in VALUES.into_iter().filter(|v| *v != 0xFF) {
        let pat = run_script("mismatch", |s| {
            s.write_data(v)?;
            let verdict = s.read_data(v + 1)?;
            assert!(!verdict.passed());
            Ok(())
        });
        assert_eq!(pat.failure_count(), 1);
        let failure = &pat.failures()[0];
        assert_eq!(failure.pin, "data");
        assert_eq!(failure.expected, v + 1);
        assert_eq!(failure.actual, v);
        assert_eq!(failure.cycle, 3);
    }
}

#[test]
fn generation_continues_past_a_failure() {
    let pat = run_script("continue", |s| {
        s.write_data(0x10)?;
        s.read_data(0x11)?;
        s.write_data(0x20)?;
        s.read_data(0x20)?;
        Ok(())
    });
    assert_eq!(pat.failure_count(), 1);
    assert_eq!(pat.assertion_count(), 2);
    assert_eq!(pat.total_cycles(), 6);
}

/// `read_data` compares the bus as committed by its own enable cycle. A data
/// drive still pending when `read_data` starts is therefore visible to the
/// comparison. The ordering is kept literally; this test pins that behavior.
#[test]
fn read_data_sees_drives_committed_by_its_enable_cycle() {
    let pat = run_script("read_timing", |s| {
        s.write_data(0x11)?;
        s.drive("data", 0x22)?;
        s.read_data(0x22)?;
        Ok(())
    });
    assert!(pat.passed());
}

// ---------------------------------------------------------------------------
// Structural errors
// ---------------------------------------------------------------------------

#[test]
fn duplicate_pin_names_are_rejected() {
    let decls = vec![PinDecl::new("clk"), PinDecl::new("data").with_width(8), PinDecl::new("clk")];
    let err = PinSet::from_decls(&decls).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateName { ref name } if name == "clk"));
}

#[test]
fn driving_an_unknown_pin_is_rejected() {
    let mut dut = SimpleDut::new().unwrap();
    let mut tester = Tester::new();
    let mut s = Session::new("bad", &mut dut, &mut tester);
    let err = s.drive("chip_select", 1).unwrap_err();
    assert!(matches!(err, EngineError::UnknownPin { ref name } if name == "chip_select"));
    let err = s.assert("chip_select", 0).unwrap_err();
    assert!(matches!(err, EngineError::UnknownPin { .. }));
}

// ---------------------------------------------------------------------------
// Full functional pattern
// ---------------------------------------------------------------------------

fn functional() -> Pattern {
    let mut dut = SimpleDut::new().unwrap();
    let mut tester = Tester::new();
    library::run(library::find("functional_test").unwrap(), &mut dut, &mut tester).unwrap()
}

#[test]
fn functional_pattern_passes() {
    let pat = functional();
    assert!(pat.passed());
    // reset (6) + clock toggles (40) + six write/read pairs (18)
    assert_eq!(pat.total_cycles(), 64);
    assert_eq!(pat.assertion_count(), 6);
    assert_eq!(pat.final_state("data"), Some(0xF0));
    assert_eq!(pat.final_state("clk"), Some(0));
}

#[test]
fn functional_pattern_sections_in_order() {
    let pat = functional();
    let titles: Vec<&str> = pat
        .records()
        .iter()
        .filter_map(|r| match &r.op {
            Op::Section { title } => Some(title.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        titles,
        vec![
            "Functional Test Pattern",
            "Testing basic device functionality",
            "--- Clock Test ---",
            "--- Data Pattern Test ---",
            "--- Functional Test Complete ---",
        ]
    );
}

#[test]
fn record_stamps_never_decrease() {
    let pat = functional();
    assert!(pat.records().windows(2).all(|w| w[0].cycle <= w[1].cycle));
    let cycles = pat
        .records()
        .iter()
        .filter(|r| r.kind() == RecordKind::Cycle)
        .count() as u64;
    assert_eq!(cycles, pat.total_cycles());
}

#[test]
fn functional_pattern_is_repeatable() {
    let a = functional();
    let b = functional();
    assert_eq!(a.compare(&b), PatternComparison::Identical);
    assert_eq!(a.signature(), b.signature());
}

#[test]
fn functional_pattern_serializes() {
    let pat = functional();
    let json = serde_json::to_string(&pat).unwrap();
    let back: Pattern = serde_json::from_str(&json).unwrap();
    assert_eq!(back, pat);
}

#[test]
fn declared_device_runs_library_patterns() {
    let decls = vec![
        PinDecl::new("tck"),
        PinDecl::new("dq").with_width(16),
        PinDecl::new("ce"),
        PinDecl::new("rst_n").with_initial(1),
    ];
    let port = PortMap {
        clock: Some("tck".into()),
        data: Some("dq".into()),
        enable: Some("ce".into()),
        reset: Some("rst_n".into()),
    };
    let mut dut = DeclaredDut::new("wide_dut", &decls, port).unwrap();
    assert_eq!(dut.port_pin(strobe_engine::PortRole::Data).unwrap(), "dq");
    let mut tester = Tester::new();
    let pat =
        library::run(library::find("functional_test").unwrap(), &mut dut, &mut tester).unwrap();
    assert!(pat.passed());
    assert_eq!(pat.total_cycles(), 64);
}

fn replay_final_states(pat: &Pattern) -> Vec<u64> {
    let mut state: Vec<u64> = pat.pins().iter().map(|p| p.initial).collect();
    let mut pending: Vec<Option<u64>> = pat.pins().iter().map(|p| p.carried_drive).collect();
    for record in pat.records() {
        match &record.op {
            Op::Drive { pin, value } => {
                let index = pat.pins().iter().position(|p| &p.name == pin).unwrap();
                pending[index] = Some(*value);
            }
            Op::Cycle => {
                for (s, p) in state.iter_mut().zip(pending.iter_mut()) {
                    if let Some(next) = p.take() {
                        *s = next;
                    }
                }
            }
            _ => {}
        }
    }
    state
}

#[test]
fn back_to_back_patterns_replay_to_their_final_state() {
    let mut dut = SimpleDut::new().unwrap();
    let mut tester = Tester::new();
    for def in library::all().iter().chain(library::all()) {
        let pat = library::run(def, &mut dut, &mut tester).unwrap();
        let expected: Vec<u64> = pat.pins().iter().map(|p| p.final_state).collect();
        assert_eq!(replay_final_states(&pat), expected, "pattern {}", pat.name());
    }
}
