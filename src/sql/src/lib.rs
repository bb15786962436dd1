// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! SQL planning support: scalar type conversion and function overload
//! selection.
//!
//! Given a function name and the static types of its call-site arguments,
//! [`func::select_impl`] selects the single best-matching implementation
//! registered in an injected [`catalog::FuncCatalog`], reports the
//! per-position conversions the caller must insert, or reports that no
//! implementation is usable. The pipeline is:
//!
//! ```text
//! lookup → arity filter → compatibility → specificity → result type
//! ```
//!
//! Resolution is a pure function of its inputs: the catalog is an immutable
//! value, the resolver holds no state, and the entry point may be called
//! concurrently from any number of planning threads. Catalogs are replaced
//! wholesale (e.g. behind an `Arc` swap) when the schema changes.

pub mod builtins;
pub mod catalog;
pub mod error;
pub mod func;
pub mod typeconv;
