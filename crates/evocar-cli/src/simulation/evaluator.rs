use evocar_network::Activation;
use evocar_training::{Agent, Evaluation, Genotype, TrainingError};
use tracing::debug;

use super::{Car, Track};

/// Evaluates a population by letting one car per genotype drive the track at once.
///
/// [`Evaluation::begin_evaluation`] only places the cars. [`finish`](Self::finish) then
/// steps all cars until none is alive and hands the evaluated population back, ready for
/// [`GeneticAlgorithm::evaluation_finished`](evocar_training::GeneticAlgorithm::evaluation_finished).
#[derive(Debug)]
pub struct TrackEvaluator {
    track: Track,
    topology: Vec<usize>,
    activation: Activation,
    cars: Vec<Car>,
    alive: usize,
    generation: u32,
}

impl TrackEvaluator {
    pub fn new(track: Track, topology: Vec<usize>, activation: Activation) -> Self {
        Self {
            track,
            topology,
            activation,
            cars: vec![],
            alive: 0,
            generation: 0,
        }
    }

    #[cfg(test)]
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Advances every live car by one time step.
    pub fn step(&mut self) -> Result<(), TrainingError> {
        for car in &mut self.cars {
            if car.step(&self.track)? {
                self.alive -= 1;
            }
        }
        Ok(())
    }

    /// Drives the pending generation to the end.
    ///
    /// Cars still alive when the track's step budget runs out are stopped where they are.
    /// Returns `None` if no evaluation is pending.
    pub fn finish(&mut self) -> Result<Option<Vec<Genotype>>, TrainingError> {
        if self.cars.is_empty() {
            return Ok(None);
        }

        let max_steps = self.track.config().max_steps;
        let mut steps = 0;
        while self.alive > 0 && steps < max_steps {
            self.step()?;
            steps += 1;
        }
        if self.alive > 0 {
            debug!(alive = self.alive, "step budget exhausted, stopping remaining cars");
            for car in &mut self.cars {
                if car.kill() {
                    self.alive -= 1;
                }
            }
        }
        debug!(generation = self.generation, steps, "all cars stopped");

        Ok(Some(self.cars.drain(..).map(Car::into_genotype).collect()))
    }
}

impl Evaluation for TrackEvaluator {
    fn begin_evaluation(
        &mut self,
        generation: u32,
        population: Vec<Genotype>,
    ) -> Result<(), TrainingError> {
        self.cars = population
            .into_iter()
            .map(|genotype| {
                let agent = Agent::new(genotype, &self.topology, self.activation)?;
                Car::new(agent, &self.track)
            })
            .collect::<Result<_, _>>()?;
        self.alive = self.cars.len();
        self.generation = generation;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use evocar_network::Network;
    use evocar_training::{GeneticAlgorithm, GeneticAlgorithmParams, Operators};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::config::TrackConfig;

    const TOPOLOGY: [usize; 3] = [5, 4, 2];

    fn evaluator() -> TrackEvaluator {
        TrackEvaluator::new(
            Track::new(TrackConfig::default()),
            TOPOLOGY.to_vec(),
            Activation::SoftSign,
        )
    }

    fn random_population(count: usize, rng: &mut Pcg64Mcg) -> Vec<Genotype> {
        let parameter_count = Network::weight_count_of(&TOPOLOGY);
        (0..count)
            .map(|_| Genotype::random(parameter_count, -1.0, 1.0, rng))
            .collect()
    }

    #[test]
    fn test_evaluates_every_genotype() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let mut evaluator = evaluator();
        assert!(evaluator.finish().unwrap().is_none());

        evaluator
            .begin_evaluation(1, random_population(8, &mut rng))
            .unwrap();
        assert_eq!(evaluator.alive_count(), 8);

        let population = evaluator.finish().unwrap().unwrap();
        assert_eq!(population.len(), 8);
        assert_eq!(evaluator.alive_count(), 0);
        assert!(
            population
                .iter()
                .all(|g| (0.0..=1.0).contains(&g.evaluation()))
        );
        assert!(evaluator.finish().unwrap().is_none());
    }

    #[test]
    fn test_step_budget_stops_cars() {
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let mut evaluator = TrackEvaluator::new(
            Track::new(TrackConfig {
                max_steps: 1,
                ..TrackConfig::default()
            }),
            TOPOLOGY.to_vec(),
            Activation::SoftSign,
        );
        evaluator
            .begin_evaluation(1, random_population(4, &mut rng))
            .unwrap();
        assert_eq!(evaluator.finish().unwrap().unwrap().len(), 4);
        assert_eq!(evaluator.alive_count(), 0);
    }

    #[test]
    fn test_rejects_wrong_parameter_count() {
        let mut evaluator = evaluator();
        let err = evaluator
            .begin_evaluation(1, vec![Genotype::new(vec![0.0; 3])])
            .unwrap_err();
        assert!(matches!(err, TrainingError::ParameterCountMismatch { .. }));
    }

    #[test]
    fn test_drives_genetic_algorithm() {
        let params = GeneticAlgorithmParams {
            population_size: 10,
            parameter_count: Network::weight_count_of(&TOPOLOGY),
            ..GeneticAlgorithmParams::default()
        };
        let mut ga = GeneticAlgorithm::new(
            params,
            Operators::default(),
            evaluator(),
            Pcg64Mcg::seed_from_u64(5),
        )
        .unwrap();

        ga.start().unwrap();
        for generation in 1..=3 {
            let population = ga.evaluator_mut().finish().unwrap().unwrap();
            let outcome = ga.evaluation_finished(population).unwrap();
            assert_eq!(outcome.stats().generation, generation);
        }
        assert_eq!(ga.generation(), 4);
        assert_eq!(ga.evaluator().alive_count(), 10);
    }
}
