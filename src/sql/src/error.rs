// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Errors produced while selecting a function implementation.

use std::error::Error;
use std::fmt;

use itertools::Itertools;

use crate::func::Arity;

/// An unrecoverable failure raised while resolving a function call.
///
/// Ambiguity is deliberately not represented here: when several
/// implementations tie, resolution yields no result and the caller decides
/// how (and how loudly) to report it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolveError {
    /// No implementation is registered under the name.
    UnknownFunction {
        /// The name as written at the call site.
        name: String,
    },
    /// Implementations exist, but none accepts the number of arguments
    /// supplied.
    WrongArity {
        /// The name as written at the call site.
        name: String,
        /// How many arguments the call site supplied.
        count: usize,
        /// The argument counts the registered implementations accept,
        /// de-duplicated and sorted.
        acceptable: Vec<Arity>,
    },
}

impl ResolveError {
    /// A suggestion a client may attach to the rendered error.
    pub fn hint(&self) -> Option<String> {
        match self {
            ResolveError::UnknownFunction { .. } => Some(
                "No function matches the given name and argument types. \
                 You might need to add explicit type casts."
                    .into(),
            ),
            ResolveError::WrongArity { .. } => None,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolveError::UnknownFunction { name } => {
                write!(f, "function {} does not exist", name)
            }
            ResolveError::WrongArity {
                name,
                count,
                acceptable,
            } => write!(
                f,
                "wrong argument count {} for function {} (accepts {})",
                count,
                name,
                acceptable.iter().join(" or "),
            ),
        }
    }
}

impl Error for ResolveError {}
