// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The catalog consulted during function selection.
//!
//! The resolver is handed a catalog rather than reaching for a global
//! registry, so test doubles and multiple catalogs (e.g. a shadow catalog
//! during a schema migration) can coexist. [`Catalog`] is the standard
//! implementation: an immutable value assembled by [`CatalogBuilder`] and
//! replaced wholesale when the schema changes, never mutated in place.

use std::collections::BTreeMap;

use quarry_repr::{TypeId, TypeRegistry};

use crate::func::{FuncImpl, ParamList, ReturnType};
use crate::typeconv::{CastContext, CastTable, CommonTypeTable};

/// The read-only surface the resolver consumes.
pub trait FuncCatalog {
    /// Returns the implementations registered under `name`, in registration
    /// order. `None` and an empty slice both mean the name is unknown.
    fn funcs(&self, name: &str) -> Option<&[FuncImpl]>;

    /// Returns the cast edge `from → to`, if one is registered. Identity
    /// casts are implied and never appear as edges.
    fn cast(&self, from: TypeId, to: TypeId) -> Option<CastContext>;

    /// Infers the common type of `a` and `b`, or `None` if they have none.
    fn common_type(&self, a: TypeId, b: TypeId) -> Option<TypeId>;
}

/// An immutable catalog of scalar types, cast edges, common-type rules, and
/// function implementations.
#[derive(Clone, Debug)]
pub struct Catalog {
    types: TypeRegistry,
    casts: CastTable,
    commons: CommonTypeTable,
    funcs: BTreeMap<String, Vec<FuncImpl>>,
}

impl Catalog {
    /// Starts building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Returns the registry of this catalog's scalar types.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Resolves a type name to its id.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.types.get(name)
    }
}

impl FuncCatalog for Catalog {
    fn funcs(&self, name: &str) -> Option<&[FuncImpl]> {
        self.funcs.get(name).map(Vec::as_slice)
    }

    fn cast(&self, from: TypeId, to: TypeId) -> Option<CastContext> {
        self.casts.get(from, to)
    }

    fn common_type(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if a == b {
            return Some(a);
        }
        if let Some(common) = self.commons.get(a, b) {
            return Some(common);
        }
        // Fall back to the implicit cast graph: a type that implicitly
        // widens into the other has that other as its common type. The
        // registered table wins when both apply.
        if self.casts.get(a, b) == Some(CastContext::Implicit) {
            return Some(b);
        }
        if self.casts.get(b, a) == Some(CastContext::Implicit) {
            return Some(a);
        }
        None
    }
}

/// Accumulates registrations and freezes them into a [`Catalog`].
///
/// Registration order defines type ids and the candidate order within each
/// function name. Misregistrations (duplicate casts, a picking result on a
/// shape without a picking region) are programmer errors and panic.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    types: TypeRegistry,
    casts: Vec<(TypeId, TypeId, CastContext)>,
    commons: Vec<(TypeId, TypeId, TypeId)>,
    funcs: BTreeMap<String, Vec<FuncImpl>>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    pub fn new() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Registers a scalar type and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn register_type(&mut self, name: &str) -> TypeId {
        self.types.register(name)
    }

    /// Registers the cast edge `from → to` applicable in `ctx`.
    pub fn register_cast(&mut self, from: TypeId, to: TypeId, ctx: CastContext) -> &mut Self {
        self.casts.push((from, to, ctx));
        self
    }

    /// Records `common` as the common type of `a` and `b`, overriding the
    /// derivation from the implicit cast graph.
    pub fn register_common_type(&mut self, a: TypeId, b: TypeId, common: TypeId) -> &mut Self {
        self.commons.push((a, b, common));
        self
    }

    /// Registers an implementation of `name`.
    ///
    /// # Panics
    ///
    /// Panics if `return_type` is [`ReturnType::Picking`] but `params` has
    /// no inferred trailing region.
    pub fn register_func(
        &mut self,
        name: &str,
        params: ParamList,
        return_type: ReturnType,
    ) -> &mut Self {
        assert!(
            !matches!(return_type, ReturnType::Picking) || params.picking_start().is_some(),
            "function {} declares an inferred result but its shape has no inferred region",
            name
        );
        self.funcs
            .entry(name.to_owned())
            .or_default()
            .push(FuncImpl {
                params,
                return_type,
            });
        self
    }

    /// Freezes the registrations into an immutable [`Catalog`].
    ///
    /// # Panics
    ///
    /// Panics on duplicate cast edges, identity cast edges, or duplicate
    /// common-type pairs.
    pub fn build(self) -> Catalog {
        let width = self.types.len();
        let mut casts = CastTable::new(width);
        for (from, to, ctx) in self.casts {
            casts.insert(from, to, ctx);
        }
        let mut commons = CommonTypeTable::new(width);
        for (a, b, common) in self.commons {
            commons.insert(a, b, common);
        }
        Catalog {
            types: self.types,
            casts,
            commons,
            funcs: self.funcs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_type_falls_back_to_implicit_casts() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");
        let int8 = builder.register_type("int8");
        let text = builder.register_type("text");
        builder.register_cast(int4, int8, CastContext::Implicit);
        builder.register_cast(int8, int4, CastContext::Explicit);
        let catalog = builder.build();

        assert_eq!(catalog.common_type(int4, int4), Some(int4));
        assert_eq!(catalog.common_type(int4, int8), Some(int8));
        assert_eq!(catalog.common_type(int8, int4), Some(int8));
        // Explicit edges do not make a common type.
        assert_eq!(catalog.common_type(int4, text), None);
        assert_eq!(catalog.common_type(text, int8), None);
    }

    #[test]
    fn test_registered_common_type_wins() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");
        let int8 = builder.register_type("int8");
        let numeric = builder.register_type("numeric");
        builder.register_cast(int4, int8, CastContext::Implicit);
        builder.register_common_type(int4, int8, numeric);
        let catalog = builder.build();

        assert_eq!(catalog.common_type(int4, int8), Some(numeric));
        assert_eq!(catalog.common_type(int8, int4), Some(numeric));
    }

    #[test]
    #[should_panic(expected = "no inferred region")]
    fn test_picking_result_requires_picking_shape() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");
        builder.register_func(
            "f",
            ParamList::Exact(vec![int4.into()]),
            ReturnType::Picking,
        );
    }
}
