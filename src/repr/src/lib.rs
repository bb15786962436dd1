// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The core data representation for Quarry.
//!
//! This crate holds the identities of the scalar types that participate in
//! expression planning. The set of types is open: types are registered when
//! a catalog is constructed rather than enumerated in an enum, so everything
//! downstream (cast tables, overload parameter lists) is keyed by the dense
//! [`TypeId`] handed out at registration.

#![warn(missing_docs)]

mod scalar;

pub use scalar::{TypeId, TypeRegistry};
