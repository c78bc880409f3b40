//! Group-orbit computations behind the symmetry-reduced paths.
//!
//! The engines never run group theory themselves: they talk to a
//! [`GroupOrbitOracle`], an injected port whose production implementation
//! may wrap a computer-algebra system. [`NaiveOrbitOracle`] is an
//! in-crate reference implementation for small base structures; it works
//! by exhaustive search and closure, deliberately without any
//! Schreier-Sims machinery.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::combinatorics::multiset_permutations;
use crate::error::OracleError;
use crate::structure::Structure;

/// A permutation of `{1..n}`, stored as the image vector of `1..=n`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Permutation {
    images: Vec<usize>,
}

impl Permutation {
    /// Validate an image vector. `images[v - 1]` is the image of `v`.
    pub fn new(images: Vec<usize>) -> Result<Self, OracleError> {
        let n = images.len();
        let mut seen = vec![false; n];
        for &img in &images {
            if img < 1 || img > n || seen[img - 1] {
                return Err(OracleError::MalformedPermutation(images.clone(), n));
            }
            seen[img - 1] = true;
        }
        Ok(Self { images })
    }

    pub fn identity(n: usize) -> Self {
        Self {
            images: (1..=n).collect(),
        }
    }

    pub fn degree(&self) -> usize {
        self.images.len()
    }

    pub fn image(&self, v: usize) -> usize {
        self.images[v - 1]
    }

    /// Pointwise application to an ordered tuple.
    pub fn apply_tuple(&self, tuple: &[usize]) -> Vec<usize> {
        tuple.iter().map(|&v| self.image(v)).collect()
    }

    /// Application to a set, given and returned as a sorted vector.
    pub fn apply_set(&self, set: &[usize]) -> Vec<usize> {
        let mut out = self.apply_tuple(set);
        out.sort_unstable();
        out
    }

    /// Composition `self . other`: apply `other` first.
    pub fn compose(&self, other: &Permutation) -> Permutation {
        Permutation {
            images: other.images.iter().map(|&v| self.image(v)).collect(),
        }
    }
}

/// Which action of the group on index vectors is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitAction {
    /// Pointwise action on ordered tuples.
    OnTuples,
    /// Action on sets (sorted vectors).
    OnSets,
}

/// External oracle for automorphism groups, orbits and stabilizers.
///
/// All failures are fatal ([`OracleError`]); exact combinatorial queries
/// are not retried. Results are not cached between calls.
pub trait GroupOrbitOracle<S: Structure> {
    /// Generators of the automorphism group of `g` over `1..=n` labelled
    /// vertices.
    fn automorphism_generators(&self, g: &S) -> Result<Vec<Permutation>, OracleError>;

    /// Partition `domain` into orbits under the group generated by
    /// `generators`, acting as `action`. The domain must be closed under
    /// the action; orbits are returned in order of their first domain
    /// element.
    fn orbits(
        &self,
        generators: &[Permutation],
        domain: &[Vec<usize>],
        action: OrbitAction,
    ) -> Result<Vec<Vec<Vec<usize>>>, OracleError>;

    /// Generators of the subgroup stabilizing `points` under `action`
    /// (pointwise for [`OrbitAction::OnTuples`], setwise for
    /// [`OrbitAction::OnSets`]).
    fn stabilizer(
        &self,
        generators: &[Permutation],
        points: &[usize],
        action: OrbitAction,
    ) -> Result<Vec<Permutation>, OracleError>;
}

/// Reference oracle for small structures.
///
/// Automorphisms are found by exhaustive permutation search against
/// labelled equality, orbits by closure under generator application, and
/// stabilizers by computing the full group closure and filtering. Hard
/// caps keep the exhaustive approach honest: exceeding them is an
/// [`OracleError`], never a silently wrong answer.
#[derive(Clone, Debug)]
pub struct NaiveOrbitOracle {
    max_vertices: usize,
    max_group: usize,
}

impl Default for NaiveOrbitOracle {
    fn default() -> Self {
        Self {
            max_vertices: 8,
            max_group: 100_000,
        }
    }
}

impl NaiveOrbitOracle {
    pub fn with_limits(max_vertices: usize, max_group: usize) -> Self {
        Self {
            max_vertices,
            max_group,
        }
    }

    /// Full group closure from generators.
    fn closure(&self, generators: &[Permutation]) -> Result<Vec<Permutation>, OracleError> {
        let Some(first) = generators.first() else {
            return Ok(Vec::new());
        };
        let n = first.degree();
        let mut elements = vec![Permutation::identity(n)];
        let mut seen: HashSet<Vec<usize>> = elements.iter().map(|p| p.images.clone()).collect();
        let mut queue: VecDeque<Permutation> = elements.iter().cloned().collect();
        while let Some(p) = queue.pop_front() {
            for g in generators {
                let q = g.compose(&p);
                if seen.insert(q.images.clone()) {
                    if elements.len() >= self.max_group {
                        return Err(OracleError::GroupTooLarge {
                            limit: self.max_group,
                        });
                    }
                    elements.push(q.clone());
                    queue.push_back(q);
                }
            }
        }
        Ok(elements)
    }
}

impl<S: Structure + PartialEq> GroupOrbitOracle<S> for NaiveOrbitOracle {
    fn automorphism_generators(&self, g: &S) -> Result<Vec<Permutation>, OracleError> {
        let n = g.vertex_count();
        if n > self.max_vertices {
            return Err(OracleError::StructureTooLarge(n));
        }
        let vertices: Vec<usize> = (1..=n).collect();
        let mut gens = Vec::new();
        for images in multiset_permutations(&vertices) {
            let relabelled = g.induced_subgraph(&images, g.root_size());
            if &relabelled == g {
                gens.push(Permutation::new(images)?);
            }
        }
        Ok(gens)
    }

    fn orbits(
        &self,
        generators: &[Permutation],
        domain: &[Vec<usize>],
        action: OrbitAction,
    ) -> Result<Vec<Vec<Vec<usize>>>, OracleError> {
        let index: HashMap<&[usize], usize> = domain
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_slice(), i))
            .collect();
        let mut assigned = vec![false; domain.len()];
        let mut orbits = Vec::new();
        for start in 0..domain.len() {
            if assigned[start] {
                continue;
            }
            let mut orbit = Vec::new();
            let mut queue = VecDeque::from([start]);
            assigned[start] = true;
            while let Some(i) = queue.pop_front() {
                orbit.push(domain[i].clone());
                for g in generators {
                    let image = match action {
                        OrbitAction::OnTuples => g.apply_tuple(&domain[i]),
                        OrbitAction::OnSets => g.apply_set(&domain[i]),
                    };
                    let Some(&j) = index.get(image.as_slice()) else {
                        return Err(OracleError::OutsideDomain(image));
                    };
                    if !assigned[j] {
                        assigned[j] = true;
                        queue.push_back(j);
                    }
                }
            }
            orbits.push(orbit);
        }
        Ok(orbits)
    }

    fn stabilizer(
        &self,
        generators: &[Permutation],
        points: &[usize],
        action: OrbitAction,
    ) -> Result<Vec<Permutation>, OracleError> {
        let elements = self.closure(generators)?;
        let mut sorted_points = points.to_vec();
        sorted_points.sort_unstable();
        Ok(elements
            .into_iter()
            .filter(|p| match action {
                OrbitAction::OnTuples => points.iter().all(|&v| p.image(v) == v),
                OrbitAction::OnSets => p.apply_set(&sorted_points) == sorted_points,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Graph;

    fn path3() -> Graph {
        Graph::new(3, &[(1, 2), (2, 3)])
    }

    fn cycle5() -> Graph {
        Graph::new(5, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)])
    }

    #[test]
    fn permutation_validation() {
        assert!(Permutation::new(vec![2, 1, 3]).is_ok());
        assert!(Permutation::new(vec![1, 1, 3]).is_err());
        assert!(Permutation::new(vec![0, 1, 2]).is_err());
    }

    #[test]
    fn path_automorphisms() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&path3()).unwrap();
        // Identity and the end-swap.
        assert_eq!(gens.len(), 2);
        assert!(gens.contains(&Permutation::identity(3)));
        assert!(gens.contains(&Permutation::new(vec![3, 2, 1]).unwrap()));
    }

    #[test]
    fn cycle_automorphism_group_is_dihedral() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&cycle5()).unwrap();
        assert_eq!(gens.len(), 10);
    }

    #[test]
    fn singleton_orbits_of_path() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&path3()).unwrap();
        let domain: Vec<Vec<usize>> = vec![vec![1], vec![2], vec![3]];
        let orbits =
            GroupOrbitOracle::<Graph>::orbits(&oracle, &gens, &domain, OrbitAction::OnSets).unwrap();
        assert_eq!(orbits.len(), 2);
        assert_eq!(orbits[0], vec![vec![1], vec![3]]);
        assert_eq!(orbits[1], vec![vec![2]]);
    }

    #[test]
    fn tuple_orbits_distinguish_order() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&path3()).unwrap();
        let domain: Vec<Vec<usize>> = vec![vec![1, 3], vec![3, 1]];
        let orbits =
            GroupOrbitOracle::<Graph>::orbits(&oracle, &gens, &domain, OrbitAction::OnTuples)
                .unwrap();
        // The end-swap exchanges (1,3) and (3,1).
        assert_eq!(orbits.len(), 1);
    }

    #[test]
    fn orbit_domain_must_be_closed() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&path3()).unwrap();
        let domain: Vec<Vec<usize>> = vec![vec![1]];
        let err = GroupOrbitOracle::<Graph>::orbits(&oracle, &gens, &domain, OrbitAction::OnSets);
        assert!(err.is_err());
    }

    #[test]
    fn stabilizer_of_a_cycle_vertex() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&cycle5()).unwrap();
        let stab =
            GroupOrbitOracle::<Graph>::stabilizer(&oracle, &gens, &[1], OrbitAction::OnTuples)
                .unwrap();
        // Identity and the reflection through vertex 1.
        assert_eq!(stab.len(), 2);
        for p in &stab {
            assert_eq!(p.image(1), 1);
        }
    }

    #[test]
    fn setwise_stabilizer_contains_pointwise() {
        let oracle = NaiveOrbitOracle::default();
        let gens = oracle.automorphism_generators(&cycle5()).unwrap();
        let pointwise =
            GroupOrbitOracle::<Graph>::stabilizer(&oracle, &gens, &[1, 2], OrbitAction::OnTuples)
                .unwrap();
        let setwise =
            GroupOrbitOracle::<Graph>::stabilizer(&oracle, &gens, &[1, 2], OrbitAction::OnSets)
                .unwrap();
        assert!(pointwise.len() <= setwise.len());
        // The edge {1,2} is swapped by one reflection.
        assert_eq!(setwise.len(), 2);
        assert_eq!(pointwise.len(), 1);
    }
}
