// demos/pursuit.rs

use nalgebra::Vector3;
use pursuit_flight_core::{
    ControlCommand, ControlMode, CoreConfig, DroneKinematics, FlightLoop, Obstacle, RawSnapshot,
    TargetObservation,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(path).expect("config should load"),
        None => CoreConfig::default(),
    };
    let mut flight = FlightLoop::new(config).expect("config should be valid");
    let planner = flight.command_slot();
    let dt = flight.tick_interval().as_secs_f32();

    // Crude point-mass response to the actuator channels.
    let accel_gain = 12.0;
    let mut drone = DroneKinematics {
        position: Vector3::new(0.0, 10.0, 0.0),
        battery_level: 60.0,
        ..DroneKinematics::default()
    };
    let mut target = Vector3::new(40.0, 12.0, 10.0);
    let target_velocity = Vector3::new(-2.0, 0.0, 1.5);
    let obstacles = vec![Obstacle::stationary(Vector3::new(20.0, 10.0, 3.0), 1.5)];

    planner.publish(ControlCommand::new("chase-1", ControlMode::Intercept));

    println!("     t  mode        thrust    pitch     roll      yaw   range  threats");
    for tick in 0..=1200u32 {
        let t = tick as f32 * dt;
        if tick == 800 {
            planner.publish(ControlCommand::new("hold-1", ControlMode::Hover));
        }

        let snapshot = RawSnapshot {
            timestamp: f64::from(t),
            drone,
            target: TargetObservation::visible(target, target_velocity),
            obstacles: obstacles.clone(),
        };
        let output = flight.tick(&snapshot);
        let cmd = &output.command;

        if tick % 50 == 0 {
            println!(
                "{:6.2}  {:<10} {:-8.3} {:-8.3} {:-8.3} {:-8.3} {:7.2} {:8}",
                t,
                flight.executor().mode(),
                cmd.thrust,
                cmd.pitch,
                cmd.roll,
                cmd.yaw,
                output.perception.target_distance,
                output.perception.threats.len()
            );
        }

        // simulate response
        let accel = Vector3::new(cmd.pitch, (cmd.thrust - 0.5) * 2.0, cmd.roll) * accel_gain;
        drone.velocity = drone.velocity * 0.98 + accel * dt;
        drone.position += drone.velocity * dt;
        drone.orientation.z += cmd.yaw * dt;
        drone.battery_level -= 0.002;
        target += target_velocity * dt;
    }
}
