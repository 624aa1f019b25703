use crate::Genotype;

use super::Termination;

/// Terminates once `max_generations` generations have been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimit {
    pub max_generations: u32,
}

impl GenerationLimit {
    #[must_use]
    pub fn new(max_generations: u32) -> Self {
        Self { max_generations }
    }
}

impl Termination for GenerationLimit {
    fn name(&self) -> &'static str {
        "generation_limit"
    }

    fn should_terminate(&self, generation: u32, _sorted: &[Genotype]) -> bool {
        generation >= self.max_generations
    }
}

/// Terminates once any genotype reaches an evaluation of at least `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEvaluation {
    pub target: f64,
}

impl Termination for TargetEvaluation {
    fn name(&self) -> &'static str {
        "target_evaluation"
    }

    fn should_terminate(&self, _generation: u32, sorted: &[Genotype]) -> bool {
        sorted.iter().any(|g| g.evaluation() >= self.target)
    }
}
