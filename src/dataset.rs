use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::Result;

/// A single training example: an input and its expected output.
pub type Instance = (Array1<f32>, Array1<f32>);

/// An owned collection of training instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    instances: Vec<Instance>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `instances` - The `(input, target)` pairs.
    pub fn new(instances: Vec<Instance>) -> Self {
        Self { instances }
    }

    /// Generates `n` samples of `y = x² + ε`, with `x ~ U(-1, 1)` and `ε ~ N(0, noise_std)`.
    ///
    /// # Returns
    /// The dataset or an error if `noise_std` is not a valid standard deviation.
    pub fn noisy_quadratic<R>(n: usize, noise_std: f32, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let xs = Uniform::new(-1f32, 1.)?;
        let noise = Normal::new(0., noise_std)?;

        let instances = (0..n)
            .map(|_| {
                let x = xs.sample(rng);
                let y = x * x + noise.sample(rng);
                (Array1::from_elem(1, x), Array1::from_elem(1, y))
            })
            .collect();

        Ok(Self::new(instances))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Draws one instance uniformly at random, `None` if the dataset is empty.
    pub fn sample<R>(&self, rng: &mut R) -> Option<&Instance>
    where
        R: Rng + ?Sized,
    {
        sample(&self.instances, rng)
    }
}

impl From<Vec<Instance>> for Dataset {
    fn from(instances: Vec<Instance>) -> Self {
        Self::new(instances)
    }
}

/// Draws one element of `instances` uniformly at random, with replacement.
pub(crate) fn sample<'a, R>(instances: &'a [Instance], rng: &mut R) -> Option<&'a Instance>
where
    R: Rng + ?Sized,
{
    if instances.is_empty() {
        return None;
    }

    instances.get(rng.random_range(0..instances.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn noisy_quadratic_follows_the_curve() {
        let mut rng = StdRng::seed_from_u64(3);
        let dataset = Dataset::noisy_quadratic(200, 0.05, &mut rng).unwrap();

        assert_eq!(dataset.len(), 200);
        for (x, y) in dataset.instances() {
            assert_eq!((x.len(), y.len()), (1, 1));
            assert!((-1. ..1.).contains(&x[0]));
            assert!((y[0] - x[0] * x[0]).abs() < 0.5);
        }
    }

    #[test]
    fn noiseless_quadratic_is_exact() {
        let mut rng = StdRng::seed_from_u64(3);
        let dataset = Dataset::noisy_quadratic(10, 0., &mut rng).unwrap();

        for (x, y) in dataset.instances() {
            assert_eq!(y[0], x[0] * x[0]);
        }
    }

    #[test]
    fn invalid_noise_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(Dataset::noisy_quadratic(10, f32::NAN, &mut rng).is_err());
    }

    #[test]
    fn sample_draws_with_replacement() {
        let mut rng = StdRng::seed_from_u64(11);
        let dataset = Dataset::new(vec![
            (Array1::from_elem(1, 0.), Array1::from_elem(1, 0.)),
            (Array1::from_elem(1, 1.), Array1::from_elem(1, 1.)),
        ]);

        let mut seen = [0; 2];
        for _ in 0..100 {
            let (x, _) = dataset.sample(&mut rng).unwrap();
            seen[x[0] as usize] += 1;
        }

        assert_eq!(seen.iter().sum::<usize>(), 100);
        assert!(seen.iter().all(|&count| count > 20), "seen = {seen:?}");
    }

    #[test]
    fn empty_dataset_samples_nothing() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(Dataset::default().sample(&mut rng).is_none());
    }
}
