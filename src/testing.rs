//! Small concrete [`Structure`] implementations used by the test suite.
//!
//! These are deliberately naive: canonicalization is brute force over
//! relabelings (root vertices fixed pointwise), labels use one digit per
//! vertex, and everything assumes the handful-of-vertices scale the
//! tests work at. Derived `PartialEq` is labelled equality, which is
//! what the naive orbit oracle needs.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::combinatorics::{multiset_coefficient, multiset_permutations, unordered_tuples};
use crate::structure::Structure;

/// Image vectors of all relabelings of `1..=n` that fix `1..=t`
/// pointwise.
fn relabelings(n: usize, t: usize) -> Vec<Vec<usize>> {
    let tail: Vec<usize> = (t + 1..=n).collect();
    multiset_permutations(&tail)
        .into_iter()
        .map(|perm_tail| {
            let mut images: Vec<usize> = (1..=t).collect();
            images.extend(perm_tail);
            images
        })
        .collect()
}

/// Density row shared by the test structures: the fraction of ordered
/// degenerate extensions of the rooted tuple `tv` that induce each flag.
fn flag_density<S: Structure>(base: &S, tg: &S, flags: &[S], tv: &[usize]) -> Vec<BigRational> {
    let s = tg.vertex_count();
    let k = flags.first().map_or(s, |f| f.vertex_count());
    let it = base.induced_subgraph(tv, s);
    if !it.is_equal(tg) {
        return vec![BigRational::zero(); flags.len()];
    }
    let cn = base.vertex_count();
    let mut counts = vec![BigInt::zero(); flags.len()];
    let mut total = BigInt::zero();
    for ov in unordered_tuples(cn, k - s) {
        let factor = multiset_coefficient(&ov);
        let mut p = tv.to_vec();
        p.extend_from_slice(&ov);
        let ig = base.induced_subgraph(&p, s).canonical();
        total += &factor;
        for (j, flag) in flags.iter().enumerate() {
            if ig.is_equal(flag) {
                counts[j] += &factor;
                break;
            }
        }
    }
    counts
        .into_iter()
        .map(|c| BigRational::new(c, total.clone()))
        .collect()
}

fn hash_of(value: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Undirected graph on `1..=n`, with an optional rooted prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    n: usize,
    t: usize,
    edges: BTreeSet<(usize, usize)>,
}

impl Graph {
    pub fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        Self::rooted(n, edges, 0)
    }

    pub fn rooted(n: usize, edges: &[(usize, usize)], t: usize) -> Self {
        assert!(t <= n);
        let edges = edges
            .iter()
            .map(|&(a, b)| {
                assert!(a >= 1 && a <= n && b >= 1 && b <= n);
                (a.min(b), a.max(b))
            })
            .collect();
        Self { n, t, edges }
    }

    fn relabel(&self, images: &[usize]) -> Self {
        let edges = self
            .edges
            .iter()
            .map(|&(a, b)| {
                let (a, b) = (images[a - 1], images[b - 1]);
                (a.min(b), a.max(b))
            })
            .collect();
        Self {
            n: self.n,
            t: self.t,
            edges,
        }
    }
}

impl Structure for Graph {
    fn vertex_count(&self) -> usize {
        self.n
    }

    fn root_size(&self) -> usize {
        self.t
    }

    fn is_oriented(&self) -> bool {
        false
    }

    fn is_degenerate(&self) -> bool {
        self.edges.iter().any(|&(a, b)| a == b)
    }

    fn induced_subgraph(&self, vertices: &[usize], root_size: usize) -> Self {
        let m = vertices.len();
        assert!(root_size <= m);
        let mut edges = BTreeSet::new();
        for i in 0..m {
            for j in (i + 1)..m {
                let (a, b) = (vertices[i], vertices[j]);
                if a != b && self.edges.contains(&(a.min(b), a.max(b))) {
                    let _ = edges.insert((i + 1, j + 1));
                }
            }
        }
        Self {
            n: m,
            t: root_size,
            edges,
        }
    }

    fn canonical(&self) -> Self {
        relabelings(self.n, self.t)
            .iter()
            .map(|images| self.relabel(images))
            .min_by(|a, b| a.edges.cmp(&b.edges))
            .unwrap_or_else(|| self.clone())
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.n == other.n && self.t == other.t && self.canonical().edges == other.canonical().edges
    }

    fn structure_hash(&self) -> u64 {
        let c = self.canonical();
        hash_of((c.n, c.t, c.edges))
    }

    fn label(&self) -> String {
        let c = self.canonical();
        let mut out = format!("{}:", c.n);
        for (a, b) in &c.edges {
            out.push_str(&format!("{}{}", a, b));
        }
        out
    }

    fn degenerate_flag_density(
        &self,
        type_graph: &Self,
        flags: &[Self],
        root_vertices: &[usize],
    ) -> Vec<BigRational> {
        flag_density(self, type_graph, flags, root_vertices)
    }
}

/// Oriented graph on `1..=n`; loops are allowed and mark the structure
/// as degenerate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrientedGraph {
    n: usize,
    t: usize,
    edges: BTreeSet<(usize, usize)>,
}

impl OrientedGraph {
    pub fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        Self::rooted(n, edges, 0)
    }

    pub fn rooted(n: usize, edges: &[(usize, usize)], t: usize) -> Self {
        assert!(t <= n);
        let edges = edges
            .iter()
            .map(|&(a, b)| {
                assert!(a >= 1 && a <= n && b >= 1 && b <= n);
                (a, b)
            })
            .collect();
        Self { n, t, edges }
    }

    fn relabel(&self, images: &[usize]) -> Self {
        let edges = self
            .edges
            .iter()
            .map(|&(a, b)| (images[a - 1], images[b - 1]))
            .collect();
        Self {
            n: self.n,
            t: self.t,
            edges,
        }
    }
}

impl Structure for OrientedGraph {
    fn vertex_count(&self) -> usize {
        self.n
    }

    fn root_size(&self) -> usize {
        self.t
    }

    fn is_oriented(&self) -> bool {
        true
    }

    fn is_degenerate(&self) -> bool {
        self.edges.iter().any(|&(a, b)| a == b)
    }

    fn induced_subgraph(&self, vertices: &[usize], root_size: usize) -> Self {
        let m = vertices.len();
        assert!(root_size <= m);
        let mut edges = BTreeSet::new();
        for i in 0..m {
            for j in 0..m {
                if i == j {
                    continue;
                }
                let (a, b) = (vertices[i], vertices[j]);
                if a != b && self.edges.contains(&(a, b)) {
                    let _ = edges.insert((i + 1, j + 1));
                }
            }
        }
        Self {
            n: m,
            t: root_size,
            edges,
        }
    }

    fn canonical(&self) -> Self {
        relabelings(self.n, self.t)
            .iter()
            .map(|images| self.relabel(images))
            .min_by(|a, b| a.edges.cmp(&b.edges))
            .unwrap_or_else(|| self.clone())
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.n == other.n && self.t == other.t && self.canonical().edges == other.canonical().edges
    }

    fn structure_hash(&self) -> u64 {
        let c = self.canonical();
        hash_of((c.n, c.t, c.edges))
    }

    fn label(&self) -> String {
        let c = self.canonical();
        let mut out = format!("{}:", c.n);
        for (a, b) in &c.edges {
            out.push_str(&format!("{}{}", a, b));
        }
        out
    }

    fn degenerate_flag_density(
        &self,
        type_graph: &Self,
        flags: &[Self],
        root_vertices: &[usize],
    ) -> Vec<BigRational> {
        flag_density(self, type_graph, flags, root_vertices)
    }
}

/// 3-uniform hypergraph on `1..=n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreeGraph {
    n: usize,
    t: usize,
    triples: BTreeSet<(usize, usize, usize)>,
}

impl ThreeGraph {
    pub fn new(n: usize, triples: &[(usize, usize, usize)]) -> Self {
        Self::rooted(n, triples, 0)
    }

    pub fn rooted(n: usize, triples: &[(usize, usize, usize)], t: usize) -> Self {
        assert!(t <= n);
        let triples = triples
            .iter()
            .map(|&(a, b, c)| {
                assert!(a >= 1 && a <= n && b >= 1 && b <= n && c >= 1 && c <= n);
                sort3(a, b, c)
            })
            .collect();
        Self { n, t, triples }
    }

    fn relabel(&self, images: &[usize]) -> Self {
        let triples = self
            .triples
            .iter()
            .map(|&(a, b, c)| sort3(images[a - 1], images[b - 1], images[c - 1]))
            .collect();
        Self {
            n: self.n,
            t: self.t,
            triples,
        }
    }
}

fn sort3(a: usize, b: usize, c: usize) -> (usize, usize, usize) {
    let mut v = [a, b, c];
    v.sort_unstable();
    (v[0], v[1], v[2])
}

impl Structure for ThreeGraph {
    fn vertex_count(&self) -> usize {
        self.n
    }

    fn root_size(&self) -> usize {
        self.t
    }

    fn is_oriented(&self) -> bool {
        false
    }

    fn is_degenerate(&self) -> bool {
        self.triples
            .iter()
            .any(|&(a, b, c)| a == b || b == c || a == c)
    }

    fn induced_subgraph(&self, vertices: &[usize], root_size: usize) -> Self {
        let m = vertices.len();
        assert!(root_size <= m);
        let mut triples = BTreeSet::new();
        for i in 0..m {
            for j in (i + 1)..m {
                for l in (j + 1)..m {
                    let (a, b, c) = (vertices[i], vertices[j], vertices[l]);
                    if a != b && b != c && a != c && self.triples.contains(&sort3(a, b, c)) {
                        let _ = triples.insert((i + 1, j + 1, l + 1));
                    }
                }
            }
        }
        Self {
            n: m,
            t: root_size,
            triples,
        }
    }

    fn canonical(&self) -> Self {
        relabelings(self.n, self.t)
            .iter()
            .map(|images| self.relabel(images))
            .min_by(|a, b| a.triples.cmp(&b.triples))
            .unwrap_or_else(|| self.clone())
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.n == other.n
            && self.t == other.t
            && self.canonical().triples == other.canonical().triples
    }

    fn structure_hash(&self) -> u64 {
        let c = self.canonical();
        hash_of((c.n, c.t, c.triples))
    }

    fn label(&self) -> String {
        let c = self.canonical();
        let mut out = format!("{}:", c.n);
        for (a, b, c_) in &c.triples {
            out.push_str(&format!("{}{}{}", a, b, c_));
        }
        out
    }

    fn degenerate_flag_density(
        &self,
        type_graph: &Self,
        flags: &[Self],
        root_vertices: &[usize],
    ) -> Vec<BigRational> {
        flag_density(self, type_graph, flags, root_vertices)
    }
}
