use criterion::{Criterion, black_box, criterion_group, criterion_main};
use krets_solver::circuit::Circuit;
use krets_solver::prelude::Backing;

fn resistor_ladder_netlist(rungs: usize) -> String {
    let mut netlist = String::from("VSsrc n0 gnd 5\n");
    for i in 0..rungs {
        netlist.push_str(&format!("R{} n{} n{} 1k\n", 2 * i + 1, i, i + 1));
        netlist.push_str(&format!("R{} n{} gnd 1k\n", 2 * i + 2, i + 1));
    }
    netlist
}

fn benchmark_resistor_ladder_500(c: &mut Criterion) {
    let netlist = resistor_ladder_netlist(500);

    c.bench_function("resistor_ladder_500", |b| {
        b.iter(|| {
            let mut circuit = Circuit::from_netlist(&netlist).unwrap();
            let solution = circuit.dc_analysis(Backing::Sparse, 300, false).unwrap();
            black_box(solution);
        })
    });
}

criterion_group!(benches, benchmark_resistor_ladder_500);
criterion_main!(benches);
