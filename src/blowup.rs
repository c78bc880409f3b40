//! The general blow-up construction engine.
//!
//! A [`BlowupConstruction`] wraps a base structure, optional per-vertex
//! weights and a coefficient field, and computes exact sub-structure
//! densities and zero-eigenvector relation bases, either by brute
//! enumeration or, when the base structure qualifies, by enumerating
//! orbit representatives under its automorphism group.

use std::collections::{BTreeSet, HashMap};

use log::{debug, info};
use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::combinatorics::{
    composition_coefficient, compositions, multiset_coefficient, multiset_permutations, subsets,
    tuples, unordered_tuples,
};
use crate::construction::Construction;
use crate::error::{Error, Result};
use crate::field::{ExactField, FieldElement};
use crate::linear_system::Matrix;
use crate::orbits::{GroupOrbitOracle, NaiveOrbitOracle, OrbitAction};
use crate::structure::Structure;

/// Optional parameters for a blow-up construction.
#[derive(Debug, Clone, Default)]
pub struct BlowupOptions {
    /// Per-vertex weights; `None` means uniform weight 1. Length must
    /// match the base structure's vertex count.
    pub weights: Option<Vec<FieldElement>>,
    /// Coefficient field override; `None` means the rationals.
    pub field: Option<ExactField>,
    /// Disable the symmetry-reduced paths even when they would apply.
    pub no_symmetry: bool,
}

/// Weighted-count accumulator keyed by canonical form.
///
/// The hash is only a bucket selector; within a bucket, membership is
/// decided by isomorphism equality against the stored representative.
/// Entries are emitted in first-seen order.
struct DensityBins<S> {
    buckets: HashMap<u64, Vec<usize>>,
    entries: Vec<(S, FieldElement)>,
}

impl<S: Structure> DensityBins<S> {
    fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Accumulate `weight` into the bin of the (already canonical)
    /// structure `g`.
    fn add(&mut self, field: &ExactField, g: S, weight: FieldElement) {
        let bucket = self.buckets.entry(g.structure_hash()).or_default();
        for &i in bucket.iter() {
            if self.entries[i].0.is_equal(&g) {
                self.entries[i].1 = field.add(&self.entries[i].1, &weight);
                return;
            }
        }
        bucket.push(self.entries.len());
        self.entries.push((g, weight));
    }

    fn into_densities(self, field: &ExactField, total: &FieldElement) -> Vec<(S, FieldElement)> {
        self.entries
            .into_iter()
            .map(|(g, w)| (g, field.div(&w, total)))
            .collect()
    }
}

/// The blow-up of a base structure, with optional vertex weights.
#[derive(Debug, Clone)]
pub struct BlowupConstruction<S, O = NaiveOrbitOracle> {
    graph: S,
    weights: Option<Vec<FieldElement>>,
    field: ExactField,
    use_symmetry: bool,
    oracle: O,
}

impl<S: Structure> BlowupConstruction<S> {
    /// Unweighted blow-up over the rationals, with the default oracle.
    pub fn new(graph: S) -> Result<Self> {
        Self::with_options(graph, BlowupOptions::default())
    }

    pub fn with_options(graph: S, options: BlowupOptions) -> Result<Self> {
        Self::with_oracle(graph, options, NaiveOrbitOracle::default())
    }
}

impl<S: Structure, O> BlowupConstruction<S, O> {
    /// Build a blow-up construction with an explicit orbit oracle.
    ///
    /// Fails on a degenerate oriented base structure and on a weight
    /// vector whose length does not match the base structure. Symmetry
    /// reduction is enabled only when no field or weights were supplied,
    /// the base structure is undirected and non-degenerate with more
    /// than 4 vertices, and the caller did not disable it: those are the
    /// conditions under which orbit enumeration over labelled vertices
    /// is an exact replacement for the brute paths.
    pub fn with_oracle(graph: S, options: BlowupOptions, oracle: O) -> Result<Self> {
        if graph.is_oriented() && graph.is_degenerate() {
            return Err(Error::DegenerateOrientedBase);
        }
        if let Some(weights) = &options.weights {
            if weights.len() != graph.vertex_count() {
                return Err(Error::WeightCountMismatch {
                    expected: graph.vertex_count(),
                    got: weights.len(),
                });
            }
        }
        let use_symmetry = options.field.is_none()
            && options.weights.is_none()
            && !graph.is_oriented()
            && !graph.is_degenerate()
            && graph.vertex_count() > 4
            && !options.no_symmetry;
        Ok(Self {
            graph,
            weights: options.weights,
            field: options.field.unwrap_or_else(ExactField::rationals),
            use_symmetry,
            oracle,
        })
    }

    pub fn graph(&self) -> &S {
        &self.graph
    }

    pub fn weights(&self) -> Option<&[FieldElement]> {
        self.weights.as_deref()
    }

    /// Whether queries go through the symmetry-reduced paths.
    pub fn uses_symmetry(&self) -> bool {
        self.use_symmetry
    }

    /// Multinomial weight of a nondecreasing selection, times the vertex
    /// weights when present.
    fn selection_weight(&self, selection: &[usize]) -> FieldElement {
        let mut factor = self.field.from_bigint(multiset_coefficient(selection));
        if let Some(weights) = &self.weights {
            for &v in selection {
                factor = self.field.mul(&factor, &weights[v - 1]);
            }
        }
        factor
    }

    /// Validate a flag basis and return (type size, flag size). All
    /// flags must share one size; the type must fit inside it.
    fn flag_basis_sizes(type_graph: &S, flags: &[S]) -> Result<(usize, usize)> {
        let Some(first) = flags.first() else {
            return Err(Error::EmptyFlagBasis);
        };
        let k = first.vertex_count();
        for flag in flags {
            if flag.vertex_count() != k {
                return Err(Error::MixedFlagSizes(k, flag.vertex_count()));
            }
        }
        let s = type_graph.vertex_count();
        if s > k {
            return Err(Error::TypeLargerThanFlags {
                type_size: s,
                flag_size: k,
            });
        }
        Ok((s, k))
    }

    fn brute_subgraph_densities(&self, n: usize) -> Vec<(S, FieldElement)> {
        let cn = self.graph.vertex_count();
        let mut bins = DensityBins::new();
        let mut total = self.field.zero();
        for selection in unordered_tuples(cn, n) {
            let factor = self.selection_weight(&selection);
            let ig = self.graph.induced_subgraph(&selection, 0).canonical();
            total = self.field.add(&total, &factor);
            bins.add(&self.field, ig, factor);
        }
        bins.into_densities(&self.field, &total)
    }

    fn brute_zero_eigenvectors(&self, type_graph: &S, flags: &[S]) -> Result<Matrix> {
        let (s, k) = Self::flag_basis_sizes(type_graph, flags)?;
        let cn = self.graph.vertex_count();
        let mut rows = Vec::new();
        for tv in tuples(cn, s) {
            let it = self.graph.induced_subgraph(&tv, s);
            if !it.is_equal(type_graph) {
                continue;
            }
            let mut row = vec![self.field.zero(); flags.len()];
            let mut total = self.field.zero();
            for ov in unordered_tuples(cn, k - s) {
                let factor = self.selection_weight(&ov);
                let mut p = tv.clone();
                p.extend_from_slice(&ov);
                let ig = self.graph.induced_subgraph(&p, s).canonical();
                for (j, flag) in flags.iter().enumerate() {
                    if ig.is_equal(flag) {
                        row[j] = self.field.add(&row[j], &factor);
                        total = self.field.add(&total, &factor);
                        break;
                    }
                }
            }
            if !total.is_zero() {
                for entry in &mut row {
                    if !entry.is_zero() {
                        *entry = self.field.div(entry, &total);
                    }
                }
            }
            rows.push(row);
        }
        Ok(Matrix::from_rows(self.field.clone(), flags.len(), rows).reduced_row_echelon_form())
    }

    /// Literal density vectors of the flag basis over all rooted tuples,
    /// with duplicates collapsed (set semantics). The resulting matrix
    /// is not echelon-reduced.
    ///
    /// This path does not support vertex weights: the densities are
    /// taken from the structure capability directly, which has no notion
    /// of them.
    pub fn raw_zero_eigenvectors(&self, type_graph: &S, flags: &[S]) -> Result<Matrix> {
        let (s, _) = Self::flag_basis_sizes(type_graph, flags)?;
        let cn = self.graph.vertex_count();
        let mut distinct = BTreeSet::new();
        for tv in tuples(cn, s) {
            let _ = distinct.insert(self.graph.degenerate_flag_density(type_graph, flags, &tv));
        }
        let rows = distinct
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|q| self.field.from_rational(q))
                    .collect()
            })
            .collect();
        Ok(Matrix::from_rows(self.field.clone(), flags.len(), rows))
    }
}

impl<S: Structure, O: GroupOrbitOracle<S>> BlowupConstruction<S, O> {
    /// Orbit representatives of the ordered `k`-tuples extending
    /// `prefix`, each with the number of tuples it stands for.
    ///
    /// Orbits are computed on *sets* and expanded into tuples via the
    /// compositions of `k - |prefix|`; the multinomial factor of each
    /// composition accounts for all orderings within the parts, so the
    /// cheaper set action gives the same total weight as the tuple
    /// action would. Returns `(total weight, representatives)`.
    pub fn tuple_orbit_reps(&self, k: usize, prefix: &[usize]) -> Result<(BigInt, Vec<(Vec<usize>, BigInt)>)> {
        let s = prefix.len();
        assert!(s <= k, "prefix longer than the requested tuples");
        if s == k {
            // The only extension is the trivial one.
            return Ok((BigInt::one(), vec![(prefix.to_vec(), BigInt::one())]));
        }
        let cn = self.graph.vertex_count();
        let mut generators = self.oracle.automorphism_generators(&self.graph)?;
        if !prefix.is_empty() {
            let mut distinct = prefix.to_vec();
            distinct.sort_unstable();
            distinct.dedup();
            generators = self
                .oracle
                .stabilizer(&generators, &distinct, OrbitAction::OnTuples)?;
        }
        let mut domain = Vec::new();
        for size in 1..=(k - s) {
            domain.extend(subsets(cn, size));
        }
        let orbits = self.oracle.orbits(&generators, &domain, OrbitAction::OnSets)?;
        debug!(
            "{} set orbits for extensions of size {} of prefix {:?}",
            orbits.len(),
            k - s,
            prefix
        );
        let combs = compositions(k - s);
        let mut total = BigInt::zero();
        let mut reps = Vec::new();
        for orbit in &orbits {
            let rep = orbit.iter().min().cloned().expect("orbits are nonempty");
            let length = BigInt::from(orbit.len());
            for comb in &combs {
                if comb.len() != rep.len() {
                    continue;
                }
                let mut tuple = prefix.to_vec();
                for (i, &count) in comb.iter().enumerate() {
                    for _ in 0..count {
                        tuple.push(rep[i]);
                    }
                }
                let weight = composition_coefficient(comb) * &length;
                total += &weight;
                reps.push((tuple, weight));
            }
        }
        Ok((total, reps))
    }

    /// Densities via orbit representatives; algebraically identical to
    /// the brute path.
    pub fn symm_subgraph_densities(&self, n: usize) -> Result<Vec<(S, FieldElement)>> {
        let (total, reps) = self.tuple_orbit_reps(n, &[])?;
        info!("found {} orbit representatives", reps.len());
        let mut bins = DensityBins::new();
        for (p, weight) in &reps {
            let ig = self.graph.induced_subgraph(p, 0).canonical();
            bins.add(&self.field, ig, self.field.from_bigint(weight.clone()));
        }
        let total = self.field.from_bigint(total);
        Ok(bins.into_densities(&self.field, &total))
    }

    /// Zero eigenvectors via orbit representatives; algebraically
    /// identical to the brute path.
    ///
    /// Every permutation of each representative root tuple is tried: the
    /// rooted type match depends on the vertex order, not just on the
    /// orbit of the underlying set.
    pub fn symm_zero_eigenvectors(&self, type_graph: &S, flags: &[S]) -> Result<Matrix> {
        let (s, k) = Self::flag_basis_sizes(type_graph, flags)?;
        let (_, root_reps) = self.tuple_orbit_reps(s, &[])?;
        info!("found {} root orbit representatives", root_reps.len());
        let mut rows = Vec::new();
        for (root_rep, _) in &root_reps {
            for tp in multiset_permutations(root_rep) {
                let it = self.graph.induced_subgraph(&tp, s);
                if !it.is_equal(type_graph) {
                    continue;
                }
                let (_, reps) = self.tuple_orbit_reps(k, &tp)?;
                let mut row = vec![self.field.zero(); flags.len()];
                let mut total = self.field.zero();
                for (p, weight) in &reps {
                    let factor = self.field.from_bigint(weight.clone());
                    let ig = self.graph.induced_subgraph(p, s).canonical();
                    for (j, flag) in flags.iter().enumerate() {
                        if ig.is_equal(flag) {
                            row[j] = self.field.add(&row[j], &factor);
                            total = self.field.add(&total, &factor);
                            break;
                        }
                    }
                }
                if !total.is_zero() {
                    for entry in &mut row {
                        if !entry.is_zero() {
                            *entry = self.field.div(entry, &total);
                        }
                    }
                }
                rows.push(row);
            }
        }
        Ok(Matrix::from_rows(self.field.clone(), flags.len(), rows).reduced_row_echelon_form())
    }
}

impl<S: Structure, O: GroupOrbitOracle<S>> Construction<S> for BlowupConstruction<S, O> {
    fn field(&self) -> &ExactField {
        &self.field
    }

    fn subgraph_densities(&self, n: usize) -> Result<Option<Vec<(S, FieldElement)>>> {
        let densities = if self.use_symmetry {
            self.symm_subgraph_densities(n)?
        } else {
            self.brute_subgraph_densities(n)
        };
        Ok(Some(densities))
    }

    fn zero_eigenvectors(&self, type_graph: &S, flags: &[S]) -> Result<Option<Matrix>> {
        let matrix = if self.use_symmetry {
            self.symm_zero_eigenvectors(type_graph, flags)?
        } else {
            self.brute_zero_eigenvectors(type_graph, flags)?
        };
        Ok(Some(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Graph, OrientedGraph, ThreeGraph};
    use num_rational::BigRational;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn q(n: i64, d: i64) -> FieldElement {
        ExactField::rationals().from_rational(BigRational::new(n.into(), d.into()))
    }

    fn triangle() -> Graph {
        Graph::new(3, &[(1, 2), (2, 3), (1, 3)])
    }

    fn cycle5() -> Graph {
        Graph::new(5, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)])
    }

    fn density_set(densities: &[(Graph, FieldElement)]) -> Vec<(String, FieldElement)> {
        let mut set: Vec<_> = densities
            .iter()
            .map(|(g, d)| (g.label(), d.clone()))
            .collect();
        set.sort_by(|a, b| a.0.cmp(&b.0));
        set
    }

    fn densities_sum(field: &ExactField, densities: &[(Graph, FieldElement)]) -> FieldElement {
        densities
            .iter()
            .fold(field.zero(), |acc, (_, d)| field.add(&acc, d))
    }

    #[test]
    fn triangle_pair_densities() {
        let c = BlowupConstruction::new(triangle()).unwrap();
        let densities = c.subgraph_densities(2).unwrap().unwrap();
        assert_eq!(
            density_set(&densities),
            vec![
                ("2:".to_string(), q(1, 3)),
                ("2:12".to_string(), q(2, 3)),
            ]
        );
        assert_eq!(densities_sum(c.field(), &densities), q(1, 1));
    }

    #[test]
    fn complete_three_graph_has_trivial_pair_density() {
        let base = ThreeGraph::new(3, &[(1, 2, 3)]);
        let c = BlowupConstruction::new(base).unwrap();
        let densities = c.subgraph_densities(2).unwrap().unwrap();
        assert_eq!(densities.len(), 1);
        let field = ExactField::rationals();
        assert_eq!(densities[0].1, field.one());
    }

    #[test]
    fn weighted_densities_are_exact() {
        let field = ExactField::rationals();
        let path = Graph::new(3, &[(1, 2), (2, 3)]);
        let options = BlowupOptions {
            weights: Some(vec![q(1, 2), q(1, 4), q(1, 4)]),
            ..Default::default()
        };
        let c = BlowupConstruction::with_options(path, options).unwrap();
        let densities = c.subgraph_densities(2).unwrap().unwrap();
        assert_eq!(densities_sum(&field, &densities), field.one());
        let by_label = density_set(&densities);
        // Edge density: 2 (w1 w2 + w2 w3) = 3/8.
        assert!(by_label.contains(&("2:12".to_string(), q(3, 8))));
        assert!(by_label.contains(&("2:".to_string(), q(5, 8))));
    }

    #[test]
    fn weight_count_mismatch_fails_at_construction() {
        let options = BlowupOptions {
            weights: Some(vec![q(1, 2), q(1, 2)]),
            ..Default::default()
        };
        assert!(matches!(
            BlowupConstruction::with_options(triangle(), options),
            Err(Error::WeightCountMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn degenerate_oriented_base_fails_at_construction() {
        let g = OrientedGraph::new(2, &[(1, 1), (1, 2)]);
        assert!(matches!(
            BlowupConstruction::new(g),
            Err(Error::DegenerateOrientedBase)
        ));
    }

    #[test]
    fn symmetry_gate() {
        assert!(BlowupConstruction::new(cycle5()).unwrap().uses_symmetry());
        assert!(!BlowupConstruction::new(triangle()).unwrap().uses_symmetry());
        let no_symm = BlowupOptions {
            no_symmetry: true,
            ..Default::default()
        };
        assert!(!BlowupConstruction::with_options(cycle5(), no_symm)
            .unwrap()
            .uses_symmetry());
        let weighted = BlowupOptions {
            weights: Some(vec![q(1, 5); 5]),
            ..Default::default()
        };
        assert!(!BlowupConstruction::with_options(cycle5(), weighted)
            .unwrap()
            .uses_symmetry());
        let explicit_field = BlowupOptions {
            field: Some(ExactField::rationals()),
            ..Default::default()
        };
        assert!(!BlowupConstruction::with_options(cycle5(), explicit_field)
            .unwrap()
            .uses_symmetry());
    }

    #[test]
    fn symmetric_and_brute_densities_agree() {
        init_logs();
        let symm = BlowupConstruction::new(cycle5()).unwrap();
        let brute = BlowupConstruction::with_options(
            cycle5(),
            BlowupOptions {
                no_symmetry: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(symm.uses_symmetry());
        for n in 1..=3 {
            let a = symm.subgraph_densities(n).unwrap().unwrap();
            let b = brute.subgraph_densities(n).unwrap().unwrap();
            assert_eq!(density_set(&a), density_set(&b), "size {}", n);
            assert_eq!(densities_sum(symm.field(), &a), q(1, 1));
        }
    }

    #[test]
    fn symmetric_and_brute_eigenvectors_agree() {
        init_logs();
        let tg = Graph::rooted(1, &[], 1);
        let flags = vec![
            Graph::rooted(2, &[(1, 2)], 1),
            Graph::rooted(2, &[], 1),
        ];
        let symm = BlowupConstruction::new(cycle5()).unwrap();
        let brute = BlowupConstruction::with_options(
            cycle5(),
            BlowupOptions {
                no_symmetry: true,
                ..Default::default()
            },
        )
        .unwrap();
        let a = symm.zero_eigenvectors(&tg, &flags).unwrap().unwrap();
        let b = brute.zero_eigenvectors(&tg, &flags).unwrap().unwrap();
        assert_eq!(a, b);
        // Every root placement sees edge density 2/5, so the single
        // relation is [1, 3/2].
        assert_eq!(a.nrows(), 1);
        assert_eq!(a.row(0), &[q(1, 1), q(3, 2)]);
    }

    #[test]
    fn eigenvector_matrix_shape_properties() {
        let tg = Graph::rooted(1, &[], 1);
        let flags = vec![
            Graph::rooted(2, &[(1, 2)], 1),
            Graph::rooted(2, &[], 1),
        ];
        let c = BlowupConstruction::new(triangle()).unwrap();
        let m = c.zero_eigenvectors(&tg, &flags).unwrap().unwrap();
        assert!(m.nrows() <= flags.len());
        assert_eq!(m.ncols(), flags.len());
        assert_eq!(m.reduced_row_echelon_form(), m);
    }

    #[test]
    fn type_that_never_occurs_yields_no_relations() {
        // An edge type cannot occur in the blow-up of an empty graph.
        let base = Graph::new(2, &[]);
        let c = BlowupConstruction::new(base).unwrap();
        let tg = Graph::rooted(2, &[(1, 2)], 2);
        let flags = vec![
            Graph::rooted(3, &[(1, 2)], 2),
            Graph::rooted(3, &[(1, 2), (1, 3)], 2),
        ];
        let m = c.zero_eigenvectors(&tg, &flags).unwrap().unwrap();
        assert_eq!(m.nrows(), 0);
        assert_eq!(m.ncols(), 2);
    }

    #[test]
    fn flag_basis_preconditions_are_enforced() {
        let c = BlowupConstruction::new(triangle()).unwrap();
        let tg = Graph::rooted(1, &[], 1);
        assert!(matches!(
            c.zero_eigenvectors(&tg, &[]),
            Err(Error::EmptyFlagBasis)
        ));
        let mixed = vec![Graph::rooted(2, &[], 1), Graph::rooted(3, &[], 1)];
        assert!(matches!(
            c.zero_eigenvectors(&tg, &mixed),
            Err(Error::MixedFlagSizes(2, 3))
        ));
        let big_type = Graph::rooted(3, &[], 3);
        let small_flags = vec![Graph::rooted(2, &[], 2)];
        assert!(matches!(
            c.zero_eigenvectors(&big_type, &small_flags),
            Err(Error::TypeLargerThanFlags { .. })
        ));
    }

    #[test]
    fn raw_eigenvectors_have_set_semantics() {
        let c = BlowupConstruction::new(triangle()).unwrap();
        let tg = Graph::rooted(1, &[], 1);
        let flags = vec![
            Graph::rooted(2, &[(1, 2)], 1),
            Graph::rooted(2, &[], 1),
        ];
        let a = c.raw_zero_eigenvectors(&tg, &flags).unwrap();
        let b = c.raw_zero_eigenvectors(&tg, &flags).unwrap();
        assert_eq!(a, b);
        // All three root placements give the same density vector.
        assert_eq!(a.nrows(), 1);
        assert_eq!(a.row(0), &[q(2, 3), q(1, 3)]);
    }

    #[test]
    fn tuple_orbit_reps_cover_all_tuples() {
        // Total weight must equal the number of ordered k-tuples.
        let c = BlowupConstruction::new(cycle5()).unwrap();
        for k in 1..=3 {
            let (total, _) = c.tuple_orbit_reps(k, &[]).unwrap();
            assert_eq!(total, BigInt::from(5u32.pow(k as u32)));
        }
        let (total, reps) = c.tuple_orbit_reps(2, &[1]).unwrap();
        assert_eq!(total, BigInt::from(5));
        let tuple_count: BigInt = reps.iter().map(|(_, w)| w.clone()).sum();
        assert_eq!(tuple_count, BigInt::from(5));
    }

    #[test]
    fn trivial_extension_is_the_prefix_itself() {
        let c = BlowupConstruction::new(cycle5()).unwrap();
        let (total, reps) = c.tuple_orbit_reps(2, &[2, 4]).unwrap();
        assert_eq!(total, BigInt::one());
        assert_eq!(reps, vec![(vec![2, 4], BigInt::one())]);
    }
}
