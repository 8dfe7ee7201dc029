//! Closed-loop buck converter demo.
//!
//! Drives an averaged buck converter model with the controller, applies a
//! load step, rolls the controller and plant back to a checkpoint, and replays
//! the step to show the rollback reproduces the same trajectory.
//!
//! Prints CSV (`time_s,voltage_v,current_a,duty`) to stdout.

use cascade_core::{Controller, Gate, Measurements, Snapshot};
use uom::si::{
    electric_current::ampere,
    electric_potential::volt,
    f64::{ElectricCurrent, ElectricPotential, Time},
    time::second,
};

/// Simulation step (s).
const DT: f64 = 1e-6;

/// Samples between control updates.
const CONTROL_DIVIDER: usize = 10;

/// Duty-cycle value that means 100 % on-time.
const DUTY_FULL_SCALE: f64 = 300.0;

const INPUT_VOLTAGE: f64 = 12.0;
const INDUCTANCE: f64 = 100e-6;
const CAPACITANCE: f64 = 220e-6;

/// Averaged buck converter: inductor current and capacitor voltage.
#[derive(Debug, Clone, Copy)]
struct Buck {
    current: f64,
    voltage: f64,
    load_ohms: f64,
}

impl Buck {
    fn advance(&mut self, duty: f64) {
        let on_fraction = (duty / DUTY_FULL_SCALE).clamp(0.0, 1.0);
        let di = (on_fraction * INPUT_VOLTAGE - self.voltage) / INDUCTANCE;
        let dv = (self.current - self.voltage / self.load_ohms) / CAPACITANCE;

        // Diode conduction keeps the averaged inductor current non-negative.
        self.current = (self.current + di * DT).max(0.0);
        self.voltage += dv * DT;
    }
}

fn simulate(
    controller: &mut Controller,
    plant: &mut Buck,
    start: usize,
    steps: usize,
    mut record: impl FnMut(f64, &Buck, f64),
) {
    for n in start..start + steps {
        let time = n as f64 * DT;

        let mut measurements = Measurements::new(
            Gate::Hold,
            ElectricPotential::new::<volt>(plant.voltage),
            ElectricCurrent::new::<ampere>(plant.current),
        );
        if n % CONTROL_DIVIDER == 0 {
            measurements = measurements.with_gate(Gate::Active);
        }
        let duty = controller.step(
            measurements,
            Time::new::<second>(time),
            Time::new::<second>(DT),
        );

        plant.advance(duty);
        record(time, plant, duty);
    }
}

fn main() {
    let mut controller = Controller::default();
    controller.initialize();

    let mut plant = Buck {
        current: 0.0,
        voltage: 0.0,
        load_ohms: 5.0,
    };

    println!("time_s,voltage_v,current_a,duty");
    let print = |time: f64, plant: &Buck, duty: f64| {
        println!("{time:.6},{:.4},{:.4},{duty:.3}", plant.voltage, plant.current);
    };

    // Start-up.
    let startup = 20_000;
    simulate(&mut controller, &mut plant, 0, startup, &print);

    // Checkpoint before the load step.
    let checkpoint: Snapshot = controller.snapshot();
    let plant_checkpoint = plant;

    plant.load_ohms = 2.5;
    let mut original = Vec::new();
    simulate(&mut controller, &mut plant, startup, 10_000, |_, p, d| {
        original.push((p.voltage, d));
    });

    // Roll back and replay the same load step.
    controller.restore(&checkpoint);
    plant = plant_checkpoint;
    plant.load_ohms = 2.5;
    let mut replay = Vec::new();
    simulate(&mut controller, &mut plant, startup, 10_000, |time, p, d| {
        replay.push((p.voltage, d));
        print(time, p, d);
    });

    controller.terminate();

    eprintln!(
        "replay after rollback {}",
        if original == replay { "matches" } else { "differs" }
    );
    eprintln!(
        "final: {:.4} V, {:.4} A, duty {:.3}",
        plant.voltage,
        plant.current,
        controller.state().duty_cycle
    );
}
