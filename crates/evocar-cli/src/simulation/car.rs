use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use evocar_training::{Agent, Genotype, TrainingError};

use super::Track;

/// Sensor directions relative to the car's heading, from right to left.
pub const SENSOR_ANGLES: [f64; 5] = [-FRAC_PI_2, -FRAC_PI_4, 0.0, FRAC_PI_4, FRAC_PI_2];
pub const SENSOR_COUNT: usize = SENSOR_ANGLES.len();

/// Distance at which sensors saturate.
pub const SENSOR_RANGE: f64 = 10.0;
/// Speed at full engine output, per second.
pub const MAX_SPEED: f64 = 12.0;
/// Heading change at full turn output, in radians per second.
pub const MAX_TURN_RATE: f64 = 2.0;

/// A kinematic car driven by an agent's network.
///
/// Every step the car reads its sensors, feeds them to the network, and interprets the two
/// outputs, clamped to `[-1, 1]`, as engine and turn commands. The genotype's evaluation is
/// kept at the fraction of the track covered so far.
#[derive(Debug, Clone)]
pub struct Car {
    agent: Agent,
    x: f64,
    y: f64,
    heading: f64,
    max_x: f64,
    checkpoint: u32,
    since_checkpoint: f64,
}

impl Car {
    /// Places the car on the start line, aligned with the lane, and revives its agent.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfiguration`] if the agent's network does not take
    /// one input per sensor and produce engine and turn outputs.
    pub fn new(mut agent: Agent, track: &Track) -> Result<Self, TrainingError> {
        let network = agent.network();
        if network.input_count() != SENSOR_COUNT || network.output_count() != 2 {
            return Err(TrainingError::InvalidConfiguration {
                reason: format!(
                    "a car needs a network with {SENSOR_COUNT} inputs and 2 outputs, got {:?}",
                    network.topology()
                ),
            });
        }
        agent.reset();
        Ok(Self {
            agent,
            x: 0.0,
            y: track.centre_y(0.0),
            heading: track.centre_heading(0.0),
            max_x: 0.0,
            checkpoint: 0,
            since_checkpoint: 0.0,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.agent.is_alive()
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn evaluation(&self) -> f64 {
        self.agent.genotype().evaluation()
    }

    pub fn into_genotype(self) -> Genotype {
        self.agent.into_genotype()
    }

    /// Sensor readings normalized to `[0, 1]`, where 1 means no lane edge within range.
    pub fn sense(&self, track: &Track) -> [f64; SENSOR_COUNT] {
        SENSOR_ANGLES.map(|angle| {
            track.ray_distance(self.x, self.y, self.heading + angle, SENSOR_RANGE) / SENSOR_RANGE
        })
    }

    /// Advances the car by one time step.
    ///
    /// Returns `true` if the car died during this step.
    ///
    /// # Errors
    ///
    /// Returns an error if the network cannot be evaluated.
    pub fn step(&mut self, track: &Track) -> Result<bool, TrainingError> {
        if !self.is_alive() {
            return Ok(false);
        }
        let config = track.config();
        let dt = config.time_step;

        let outputs = self.agent.think(&self.sense(track))?;
        let engine = outputs[0].clamp(-1.0, 1.0);
        let turn = outputs[1].clamp(-1.0, 1.0);

        self.heading += turn * MAX_TURN_RATE * dt;
        let speed = engine * MAX_SPEED;
        self.x += self.heading.cos() * speed * dt;
        self.y += self.heading.sin() * speed * dt;

        self.max_x = self.max_x.max(self.x);
        let checkpoint = track.checkpoint_index(self.x);
        if checkpoint > self.checkpoint {
            self.checkpoint = checkpoint;
            self.since_checkpoint = 0.0;
        } else {
            self.since_checkpoint += dt;
        }

        if self.x >= track.length() {
            self.agent.genotype_mut().set_evaluation(1.0);
            return Ok(self.agent.kill());
        }
        self.agent
            .genotype_mut()
            .set_evaluation(track.completion(self.max_x));

        if !track.is_on_lane(self.x, self.y) || self.since_checkpoint > config.max_checkpoint_delay
        {
            return Ok(self.agent.kill());
        }
        Ok(false)
    }

    /// Stops the car. Returns `true` if it was alive.
    pub fn kill(&mut self) -> bool {
        self.agent.kill()
    }
}

#[cfg(test)]
mod tests {
    use evocar_network::{Activation, Network};

    use super::*;
    use crate::config::TrackConfig;

    const TOPOLOGY: [usize; 2] = [SENSOR_COUNT, 2];

    fn straight() -> Track {
        Track::new(TrackConfig {
            amplitude: 0.0,
            ..TrackConfig::default()
        })
    }

    /// A car whose engine output is `engine` and turn output is `turn`, regardless of input.
    fn constant_car(track: &Track, engine: f64, turn: f64) -> Car {
        let weight_count = Network::weight_count_of(&TOPOLOGY);
        let mut parameters = vec![0.0; weight_count];
        // bias row is last: [bias -> engine, bias -> turn]
        parameters[weight_count - 2] = engine;
        parameters[weight_count - 1] = turn;
        let agent = Agent::new(Genotype::new(parameters), &TOPOLOGY, Activation::Identity).unwrap();
        Car::new(agent, track).unwrap()
    }

    fn drive(car: &mut Car, track: &Track, max_steps: u32) -> u32 {
        for step in 1..=max_steps {
            if car.step(track).unwrap() {
                return step;
            }
        }
        max_steps
    }

    #[test]
    fn test_rejects_wrong_topology() {
        let agent = Agent::new(Genotype::new(vec![0.0; 9]), &[2, 3], Activation::Identity).unwrap();
        assert!(Car::new(agent, &straight()).is_err());
    }

    #[test]
    fn test_new_car_is_alive_at_start() {
        let track = straight();
        let car = constant_car(&track, 0.0, 0.0);
        assert!(car.is_alive());
        assert_eq!(car.position(), (0.0, 0.0));
        assert_eq!(car.evaluation(), 0.0);
        let sensors = car.sense(&track);
        assert_eq!(sensors[2], 1.0);
        assert!((sensors[0] - 0.4).abs() <= 0.02);
        assert!((sensors[4] - 0.4).abs() <= 0.02);
    }

    #[test]
    fn test_straight_driver_finishes() {
        let track = straight();
        let mut car = constant_car(&track, 1.0, 0.0);
        drive(&mut car, &track, 1000);
        assert!(!car.is_alive());
        assert_eq!(car.evaluation(), 1.0);
        assert!(!car.kill());
    }

    #[test]
    fn test_idle_car_times_out() {
        let track = straight();
        let mut car = constant_car(&track, 0.0, 0.0);
        let steps = drive(&mut car, &track, 1000);
        assert!(!car.is_alive());
        assert_eq!(car.evaluation(), 0.0);
        // 7 seconds at 0.1 seconds per step
        assert!((70..=72).contains(&steps), "{steps}");
    }

    #[test]
    fn test_turning_car_leaves_lane() {
        let track = straight();
        let mut car = constant_car(&track, 1.0, 1.0);
        drive(&mut car, &track, 1000);
        assert!(!car.is_alive());
        let (_, y) = car.position();
        assert!(y.abs() > 4.0);
        assert!(car.evaluation() > 0.0 && car.evaluation() < 1.0);
    }

    #[test]
    fn test_reversing_car_leaves_lane() {
        let track = straight();
        let mut car = constant_car(&track, -1.0, 0.0);
        assert!(car.step(&track).unwrap());
        assert_eq!(car.evaluation(), 0.0);
    }
}
