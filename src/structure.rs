//! The opaque structure capability consumed by the construction engines.
//!
//! This crate defines no combinatorial representation of its own: graphs,
//! oriented graphs, hypergraphs and friends are supplied by the caller by
//! implementing [`Structure`]. The engines only rely on degenerate
//! induced-subgraph extraction, root-respecting canonicalization and
//! isomorphism equality, and a hash consistent with that equality.

use num_rational::BigRational;
use std::fmt::Debug;

/// A combinatorial structure on `1..=vertex_count()` vertices, possibly
/// with a rooted prefix of `root_size()` vertices marking its type.
pub trait Structure: Clone + Debug {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Size of the rooted prefix (0 for unrooted structures).
    fn root_size(&self) -> usize;

    /// Whether the structure is oriented.
    fn is_oriented(&self) -> bool;

    /// Whether the structure is degenerate (structure-defined; e.g.
    /// carries loops).
    fn is_degenerate(&self) -> bool;

    /// Extract the induced sub-structure on an ordered vertex tuple.
    ///
    /// `vertices` is 1-indexed and may repeat entries; repeated entries
    /// follow the structure's degenerate-extraction semantics (in a
    /// blow-up, copies of a vertex form an independent cluster). The
    /// first `root_size` positions of the tuple become the root prefix
    /// of the result.
    fn induced_subgraph(&self, vertices: &[usize], root_size: usize) -> Self;

    /// The minimal isomorph: a canonical representative of the
    /// isomorphism class, respecting the root prefix.
    fn canonical(&self) -> Self;

    /// Equality up to isomorphism, root-respecting when rooted.
    fn is_equal(&self, other: &Self) -> bool;

    /// Hash consistent with [`Structure::is_equal`]. A hash collision
    /// must always be confirmed by `is_equal`; callers never treat equal
    /// hashes as equal structures.
    fn structure_hash(&self) -> u64;

    /// Stable textual identifier of the canonical isomorph.
    fn label(&self) -> String;

    /// Literal density vector of `flags` among degenerate extensions of
    /// the rooted tuple `root_vertices` inside this structure, as exact
    /// rationals. Only used by the raw (unweighted) eigenvector path.
    fn degenerate_flag_density(
        &self,
        type_graph: &Self,
        flags: &[Self],
        root_vertices: &[usize],
    ) -> Vec<BigRational>;
}
