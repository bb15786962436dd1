// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Scalar type identities.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a scalar type registered in a [`TypeRegistry`].
///
/// Ids are small integers assigned densely in registration order, which lets
/// tables keyed by pairs of ids (casts, common types) be stored as flat
/// arrays. A `TypeId` is only meaningful relative to the registry that
/// issued it.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct TypeId(u32);

impl TypeId {
    /// Returns the position of this id in its registry's dense index space.
    pub fn index(self) -> usize {
        usize::try_from(self.0).expect("type ids fit in usize")
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The name⇄id table for scalar types.
///
/// A registry is populated while a catalog is under construction and is
/// immutable once the catalog is built; changing the set of types means
/// building a new registry (and catalog) and swapping it in wholesale.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypeRegistry {
    names: Vec<String>,
    by_name: BTreeMap<String, TypeId>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Registers a type under `name` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn register(&mut self, name: &str) -> TypeId {
        let id = TypeId(u32::try_from(self.names.len()).expect("fewer than u32::MAX types"));
        let old = self.by_name.insert(name.to_owned(), id);
        assert!(old.is_none(), "type {} registered twice", name);
        self.names.push(name.to_owned());
        id
    }

    /// Resolves a type name to its id.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name under which `id` was registered, for error messages
    /// and logs.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    pub fn name(&self, id: TypeId) -> &str {
        &self.names[id.index()]
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Reports whether no types have been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(id, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (TypeId(u32::try_from(i).expect("checked at registration")), name.as_str()))
    }
}
