use krets_solver::circuit::Circuit;
use krets_solver::prelude::Backing;

fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
    let tol = rel_tol * expected.abs().max(1e-9);
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}

#[test]
fn resistor_divider() {
    let mut circuit = Circuit::from_netlist("R1 vcc v_out 1k\nR2 v_out gnd 1k\nvcc=2.5V\n").unwrap();
    circuit.dc_analysis(Backing::Sparse, 300, false).unwrap();
    assert_close(circuit.get_variable("v_out").unwrap(), 1.25, 0.01);
}

#[test]
fn nonlinear_diode() {
    let mut circuit = Circuit::from_netlist(
        "Rr vcc v1 0.1\nDd v1 gnd i0=1e-5 m=3 v0=0.5\nvcc=5V\n",
    )
    .unwrap();
    circuit.dc_analysis(Backing::Sparse, 300, false).unwrap();
    assert_close(circuit.get_variable("v1").unwrap(), 4.702, 0.01);
    assert_close(circuit.get_variable("d.current").unwrap(), 2.982, 0.01);
}

#[test]
fn kirchhoff_holds_on_a_resistive_ladder() {
    let mut circuit = Circuit::from_netlist(
        "VSsrc n0 gnd 5\nR1 n0 n1 1k\nR2 n1 gnd 1k\nR3 n1 n2 1k\nR4 n2 gnd 1k\n",
    )
    .unwrap();
    let solution = circuit.dc_analysis(Backing::Sparse, 300, false).unwrap();
    // Voltage divider chain: each stage halves the remaining drop.
    assert!(solution["n1"] > solution["n2"]);
    assert!(solution["n2"] > 0.0);
}

#[test]
fn rc_transient_approaches_the_steady_state_divider() {
    let mut circuit = Circuit::from_netlist(
        "R1 vcc v_out 1k\nR2 v_out gnd 1k\nCc v_out gnd 30u\nvcc=1V\n",
    )
    .unwrap();
    let (timestamps, series) = circuit
        .transient_simulation(
            0.0,
            0.1,
            &["v_out".to_string()],
            None,
            Backing::Sparse,
            300,
            false,
        )
        .unwrap();

    let v_out = &series[0];
    assert!(!timestamps.is_empty());

    // Monotonically approaches the steady-state divider (0.5 V) from below.
    for pair in v_out.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-9);
    }

    // Thevenin resistance seen by the capacitor is 500 Ohm, so RC = 15 ms;
    // by t = 5*RC = 75 ms the response should be within 1% of 0.5 V.
    let near_five_tau = timestamps
        .iter()
        .position(|&t| t >= 0.075)
        .unwrap_or(timestamps.len() - 1);
    assert_close(v_out[near_five_tau], 0.5, 0.01);
}

#[test]
fn rc_ac_sweep_rolls_off_with_frequency() {
    let mut circuit = Circuit::from_netlist(
        "R1 vcc v_out 1k\nR2 v_out gnd 1k\nCc v_out gnd 1u\nvcc=1V\n",
    )
    .unwrap();
    let (freqs, series) = circuit
        .ac_sweep(
            &["v_out".to_string()],
            10.0,
            10_000.0,
            3,
            true,
            Backing::Sparse,
            300,
            false,
        )
        .unwrap();

    assert_eq!(freqs.len(), 3);
    let mags: Vec<f64> = series[0].iter().map(|v| (v.re * v.re + v.im * v.im).sqrt()).collect();

    // Magnitude rolls off monotonically as frequency increases.
    assert!(mags[0] > mags[1]);
    assert!(mags[1] > mags[2]);

    let db = |m: f64| 20.0 * m.log10();
    assert_close(db(mags[0]), -6.02, 0.1);
}

#[test]
fn lc_resonator_peaks_near_its_natural_frequency() {
    let mut circuit =
        Circuit::from_netlist("Ll vcc v_out 1m\nCc v_out gnd 100u\nvcc=1V\n").unwrap();
    let (_freqs, series) = circuit
        .ac_sweep(
            &["v_out".to_string()],
            300.0,
            700.0,
            9,
            false,
            Backing::Sparse,
            300,
            false,
        )
        .unwrap();

    let mags: Vec<f64> = series[0]
        .iter()
        .map(|v| (v.re * v.re + v.im * v.im).sqrt())
        .collect();
    let peak = mags.iter().cloned().fold(f64::MIN, f64::max);

    // Resonance should produce substantial gain, well above the unity input.
    assert!(peak > 5.0, "expected a resonant peak, got {peak}");
}

#[test]
fn backend_choice_does_not_change_the_dc_result() {
    let netlist = "R1 vcc v_out 1k\nR2 v_out gnd 1k\nvcc=2.5V\n";

    let mut dense = Circuit::from_netlist(netlist).unwrap();
    dense.dc_analysis(Backing::Dense, 300, false).unwrap();

    let mut sparse = Circuit::from_netlist(netlist).unwrap();
    sparse.dc_analysis(Backing::Sparse, 300, false).unwrap();

    assert_close(
        dense.get_variable("v_out").unwrap(),
        sparse.get_variable("v_out").unwrap(),
        0.01,
    );
}

#[test]
fn modifying_a_resistor_mid_transient_changes_subsequent_samples() {
    let mut circuit = Circuit::from_netlist(
        "R1 vcc v_out 1k\nR2 v_out gnd 1k\nCc v_out gnd 30u\nvcc=1V\n",
    )
    .unwrap();
    circuit
        .transient_simulation(
            0.0,
            0.02,
            &["v_out".to_string()],
            None,
            Backing::Sparse,
            300,
            false,
        )
        .unwrap();

    circuit
        .get_component_for_modification("2")
        .unwrap()
        .set_resistance(9_000.0);

    let (_timestamps, series) = circuit
        .continue_transient_simulation(0.08, 1e-4, 300, false)
        .unwrap();

    // With R2 now much larger, steady state shifts toward vcc (0.9 V divider).
    let last = *series[0].last().unwrap();
    assert!(last > 0.6, "expected steady state to shift upward, got {last}");
}
