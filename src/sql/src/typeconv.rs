// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Maintains the cast metadata consulted during overload selection.
//!
//! Casts form a directed graph over registered [`TypeId`]s. Each edge is
//! labeled with the [`CastContext`] in which it may be applied, and the
//! graph stores at most one edge per ordered pair. An identity cast (source
//! equals target) is always valid, always implicit, and never stored.
//!
//! This module holds only cast *metadata*. Performing a conversion is the
//! embedder's concern; the planner merely decides which conversions to
//! insert.

use quarry_repr::TypeId;

/// The context in which a cast may be applied to a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CastContext {
    /// Safe to apply with no user input, e.g. widening `int4` to `int8`.
    Implicit,
    /// Applied only on request, e.g. narrowing `int8` to `int4`.
    Explicit,
}

/// A dense adjacency table of cast edges keyed by `(source, target)` ids.
///
/// Type ids are dense integers assigned at catalog construction, so the
/// table is a flat `width × width` array: lookups are O(1) and involve no
/// pointer chasing.
#[derive(Clone, Debug)]
pub struct CastTable {
    width: usize,
    edges: Vec<Option<CastContext>>,
}

impl CastTable {
    /// Creates an empty table over `width` registered types.
    pub fn new(width: usize) -> CastTable {
        CastTable {
            width,
            edges: vec![None; width * width],
        }
    }

    fn cell(&self, from: TypeId, to: TypeId) -> usize {
        assert!(
            from.index() < self.width && to.index() < self.width,
            "type id out of range for this catalog"
        );
        from.index() * self.width + to.index()
    }

    /// Inserts the edge `from → to`.
    ///
    /// # Panics
    ///
    /// Panics on an identity pair or if an edge for the pair is already
    /// present.
    pub fn insert(&mut self, from: TypeId, to: TypeId, ctx: CastContext) {
        assert!(from != to, "identity casts are implied and cannot be registered");
        let cell = self.cell(from, to);
        let old = self.edges[cell].replace(ctx);
        assert!(old.is_none(), "cast {} → {} registered twice", from, to);
    }

    /// Looks up the edge `from → to`. Identity pairs are the caller's to
    /// short-circuit; they are never stored here.
    pub fn get(&self, from: TypeId, to: TypeId) -> Option<CastContext> {
        self.edges[self.cell(from, to)]
    }
}

/// Explicitly registered common-type pairs, stored symmetrically in the same
/// dense layout as [`CastTable`].
///
/// These override the derivation a catalog would otherwise perform from its
/// implicit cast edges; see `Catalog::common_type`.
#[derive(Clone, Debug)]
pub struct CommonTypeTable {
    width: usize,
    commons: Vec<Option<TypeId>>,
}

impl CommonTypeTable {
    /// Creates an empty table over `width` registered types.
    pub fn new(width: usize) -> CommonTypeTable {
        CommonTypeTable {
            width,
            commons: vec![None; width * width],
        }
    }

    fn cell(&self, a: TypeId, b: TypeId) -> usize {
        assert!(
            a.index() < self.width && b.index() < self.width,
            "type id out of range for this catalog"
        );
        a.index() * self.width + b.index()
    }

    /// Records `common` as the common type of `a` and `b`, in both
    /// orientations.
    ///
    /// # Panics
    ///
    /// Panics if the pair already has a recorded common type.
    pub fn insert(&mut self, a: TypeId, b: TypeId, common: TypeId) {
        for (x, y) in [(a, b), (b, a)] {
            let cell = self.cell(x, y);
            let old = self.commons[cell].replace(common);
            assert!(
                old.is_none() || (x == y && old == Some(common)),
                "common type of {} and {} registered twice",
                x,
                y
            );
        }
    }

    /// Looks up the recorded common type of `a` and `b`, if any.
    pub fn get(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        self.commons[self.cell(a, b)]
    }
}
