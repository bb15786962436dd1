// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Matches function call sites to their registered implementations.
//!
//! A function name can carry several implementations distinguished by call
//! shape. [`select_impl`] narrows them by argument count, classifies how
//! each argument matches each surviving implementation (exactly, via an
//! implicit cast, or via an explicit-only cast), and keeps the candidates no
//! other candidate beats position-by-position. A unique survivor wins; a tie
//! is reported as an absent result for the caller to turn into a diagnostic.

use std::fmt;
use std::ops::Index;

use itertools::Itertools;
use tracing::{debug, trace};

use quarry_repr::TypeId;

use crate::catalog::FuncCatalog;
use crate::error::ResolveError;
use crate::typeconv::CastContext;

/// Describes the type accepted at one parameter position.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ParamType {
    /// Accepts an argument of any type, including one whose type is not yet
    /// known, at no conversion cost.
    Any,
    /// Accepts arguments of the embedded type, or of any type with a cast
    /// edge to it.
    Plain(TypeId),
}

/// Provides a shorthand for writing `ParamType::Plain`.
impl From<TypeId> for ParamType {
    fn from(id: TypeId) -> ParamType {
        ParamType::Plain(id)
    }
}

/// Describes the positions accepted by one implementation.
///
/// The variants are the closed set of call shapes: a fixed list of
/// positions, a fixed prefix followed by a statically typed repeated region,
/// or a fixed prefix followed by a trailing region whose type is inferred
/// from the call site. Repeated and inferred regions may cover zero
/// positions.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParamList {
    /// Fixed positions only.
    Exact(Vec<ParamType>),
    /// A fixed prefix, then any number of arguments of the repeated type.
    Variadic {
        /// The leading fixed positions.
        fixed: Vec<ParamType>,
        /// The type accepted at every trailing position.
        repeated: ParamType,
    },
    /// A fixed prefix, then a trailing region whose effective type is the
    /// common type of the arguments occupying it, computed at resolution
    /// time rather than declared.
    Picking {
        /// The leading fixed positions.
        fixed: Vec<ParamType>,
    },
}

impl ParamList {
    /// Reports whether a call with `n` arguments can cover this shape.
    pub fn accepts_args(&self, n: usize) -> bool {
        match self {
            ParamList::Exact(params) => params.len() == n,
            ParamList::Variadic { fixed, .. } | ParamList::Picking { fixed } => n >= fixed.len(),
        }
    }

    /// Returns the argument counts this shape accepts.
    pub fn arity(&self) -> Arity {
        match self {
            ParamList::Exact(params) => Arity::Exactly(params.len()),
            ParamList::Variadic { fixed, .. } | ParamList::Picking { fixed } => {
                Arity::AtLeast(fixed.len())
            }
        }
    }

    /// Returns the index of the first position of the inferred trailing
    /// region, if this shape has one.
    pub fn picking_start(&self) -> Option<usize> {
        match self {
            ParamList::Exact(_) | ParamList::Variadic { .. } => None,
            ParamList::Picking { fixed } => Some(fixed.len()),
        }
    }
}

impl Index<usize> for ParamList {
    type Output = ParamType;

    fn index(&self, i: usize) -> &ParamType {
        match self {
            ParamList::Exact(params) => &params[i],
            ParamList::Variadic { fixed, repeated } => fixed.get(i).unwrap_or(repeated),
            // Inferred positions carry no static requirement; the real
            // constraint is applied by common-type folding.
            ParamList::Picking { fixed } => fixed.get(i).unwrap_or(&ParamType::Any),
        }
    }
}

/// Provides a shorthand for writing `ParamList::Exact`.
impl From<Vec<ParamType>> for ParamList {
    fn from(params: Vec<ParamType>) -> ParamList {
        ParamList::Exact(params)
    }
}

/// Builds a [`ParamList`].
///
/// `params!(a, b)` is a fixed two-position shape, `params!()` a zero-arity
/// shape, and `params!(t...)` a shape repeating `t` from position zero.
/// Anything convertible into a [`ParamType`] can appear, so `TypeId`s work
/// directly.
#[macro_export]
macro_rules! params {
    ($p:ident...) => { $crate::func::ParamList::Variadic {
        fixed: vec![],
        repeated: $p.into(),
    } };
    ($($p:expr),*) => { $crate::func::ParamList::Exact(vec![$($p.into(),)*]) };
}

/// The argument counts a call shape accepts, for arity diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Arity {
    /// Exactly this many arguments.
    Exactly(usize),
    /// This many arguments or more.
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{} or more", n),
        }
    }
}

/// Describes how an implementation's result type is determined.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReturnType {
    /// The result is always of the embedded type.
    Fixed(TypeId),
    /// The result is the common type inferred for the shape's trailing
    /// region. Only legal on shapes with such a region.
    Picking,
}

/// Describes a single function implementation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FuncImpl {
    /// The positions this implementation accepts.
    pub params: ParamList,
    /// How this implementation's result type is determined.
    pub return_type: ReturnType,
}

/// How an actual argument matched its expected parameter type.
///
/// The derived order is the preference order used when ranking candidates:
/// an exact match beats an implicit cast, which beats an explicit-only cast.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ArgMatch {
    /// The types were equal, or the parameter accepts any type.
    Exact,
    /// An implicit cast bridges the gap.
    ImplicitCast,
    /// Only an explicit cast bridges the gap.
    ExplicitCast,
}

/// The outcome of a successful resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution<'a> {
    /// The winning implementation.
    pub fimpl: &'a FuncImpl,
    /// How each argument matched the winner, in position order. `None` when
    /// the winner was a name's sole implementation, which is accepted
    /// without compatibility evaluation; any incompatibility then surfaces
    /// at evaluation time rather than blocking planning.
    pub arg_matches: Option<Vec<ArgMatch>>,
    /// The common type inferred for the shape's trailing region, if the
    /// shape has one and its occupants had a common type. Arguments in the
    /// region are cast to this type.
    pub picked_type: Option<TypeId>,
    /// The resolved result type. `None` means the result derives from a
    /// region with no inferable common type; the caller chooses a default.
    pub return_type: Option<TypeId>,
}

/// Tracks one candidate implementation during ranking.
#[derive(Clone, Debug)]
struct Candidate<'a> {
    fimpl: &'a FuncImpl,
    matches: Vec<ArgMatch>,
}

impl Candidate<'_> {
    /// Reports whether every position avoids explicit-only casts.
    fn implicit_safe(&self) -> bool {
        !self.matches.contains(&ArgMatch::ExplicitCast)
    }
}

/// Selects the best implementation of `name` for arguments of the given
/// types, where `None` marks an argument whose type is not yet determined
/// (e.g. an untyped literal).
///
/// Returns the winning [`Resolution`], `Ok(None)` when no implementation is
/// type-compatible or several tie at maximal specificity (the caller owns
/// how to report that), or an error when the name is unknown or no
/// implementation accepts the argument count.
///
/// This is a pure function of its inputs: it holds no state and may be
/// called concurrently against a shared catalog.
pub fn select_impl<'a, C>(
    catalog: &'a C,
    name: &str,
    types: &[Option<TypeId>],
) -> Result<Option<Resolution<'a>>, ResolveError>
where
    C: FuncCatalog + ?Sized,
{
    let impls = match catalog.funcs(name) {
        Some(impls) if !impls.is_empty() => impls,
        _ => {
            return Err(ResolveError::UnknownFunction {
                name: name.to_owned(),
            })
        }
    };

    let arity_ok: Vec<&FuncImpl> = impls
        .iter()
        .filter(|fimpl| fimpl.params.accepts_args(types.len()))
        .collect();
    if arity_ok.is_empty() {
        return Err(ResolveError::WrongArity {
            name: name.to_owned(),
            count: types.len(),
            acceptable: impls
                .iter()
                .map(|fimpl| fimpl.params.arity())
                .sorted()
                .dedup()
                .collect(),
        });
    }

    // A name with a single registered implementation is accepted without
    // compatibility evaluation, so it stays callable even when the catalog
    // carries no cast metadata for the operand types. Incompatible operands
    // then fail at evaluation time. This applies only to a sole *registered*
    // implementation, never to a sole survivor of the arity filter.
    if impls.len() == 1 {
        trace!(
            "function {} has a single implementation; accepting without compatibility checks",
            name
        );
        return Ok(Some(build_resolution(catalog, arity_ok[0], None, types)));
    }

    let candidates: Vec<Candidate> = arity_ok
        .into_iter()
        .filter_map(|fimpl| {
            argument_matches(catalog, fimpl, types).map(|matches| Candidate { fimpl, matches })
        })
        .collect();
    trace!(
        "function {}: {} of {} implementations are type-compatible",
        name,
        candidates.len(),
        impls.len()
    );
    if candidates.is_empty() {
        return Ok(None);
    }

    Ok(find_match(catalog, name, types, candidates))
}

/// Classifies how each argument matches `fimpl`, or `None` if any position
/// is incompatible.
fn argument_matches<C>(
    catalog: &C,
    fimpl: &FuncImpl,
    types: &[Option<TypeId>],
) -> Option<Vec<ArgMatch>>
where
    C: FuncCatalog + ?Sized,
{
    let mut matches = Vec::with_capacity(types.len());
    for (i, typ) in types.iter().enumerate() {
        let m = match (&fimpl.params[i], typ) {
            (ParamType::Any, _) => ArgMatch::Exact,
            // An undetermined literal is not assumed to satisfy a concrete
            // parameter.
            (ParamType::Plain(_), None) => return None,
            // Identity never consults the cast graph.
            (ParamType::Plain(want), Some(have)) if want == have => ArgMatch::Exact,
            (ParamType::Plain(want), Some(have)) => match catalog.cast(*have, *want)? {
                CastContext::Implicit => ArgMatch::ImplicitCast,
                CastContext::Explicit => ArgMatch::ExplicitCast,
            },
        };
        matches.push(m);
    }
    Some(matches)
}

/// Ranks type-compatible candidates and builds the resolution for a unique
/// winner, or returns `None` on a specificity tie.
fn find_match<'a, C>(
    catalog: &C,
    name: &str,
    types: &[Option<TypeId>],
    mut candidates: Vec<Candidate<'a>>,
) -> Option<Resolution<'a>>
where
    C: FuncCatalog + ?Sized,
{
    // Explicit-only edges are a fallback: they compete only when no
    // candidate got by on implicit conversions alone.
    if candidates.iter().any(Candidate::implicit_safe) {
        candidates.retain(Candidate::implicit_safe);
    }

    let minimal: Vec<&Candidate> = candidates
        .iter()
        .filter(|candidate| {
            !candidates
                .iter()
                .any(|other| strictly_more_specific(&other.matches, &candidate.matches))
        })
        .collect();

    match minimal.as_slice() {
        [winner] => Some(build_resolution(
            catalog,
            winner.fimpl,
            Some(winner.matches.clone()),
            types,
        )),
        _ => {
            debug!(
                "function {} is ambiguous: {} implementations tie at maximal specificity",
                name,
                minimal.len()
            );
            None
        }
    }
}

/// `a ⪯ b`: position by position, `a` matches at least as well as `b`.
fn at_least_as_specific(a: &[ArgMatch], b: &[ArgMatch]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y)
}

/// `a ≺ b`: `a ⪯ b` and at least one position matches strictly better.
fn strictly_more_specific(a: &[ArgMatch], b: &[ArgMatch]) -> bool {
    at_least_as_specific(a, b) && a.iter().zip(b).any(|(x, y)| x < y)
}

/// Assembles the [`Resolution`] for a chosen implementation, inferring the
/// trailing-region type when the shape has one.
fn build_resolution<'a, C>(
    catalog: &C,
    fimpl: &'a FuncImpl,
    arg_matches: Option<Vec<ArgMatch>>,
    types: &[Option<TypeId>],
) -> Resolution<'a>
where
    C: FuncCatalog + ?Sized,
{
    let picked_type = fimpl
        .params
        .picking_start()
        .and_then(|start| pick_common_type(catalog, types.get(start..).unwrap_or(&[])));
    let return_type = match fimpl.return_type {
        ReturnType::Fixed(typ) => Some(typ),
        ReturnType::Picking => picked_type,
    };
    Resolution {
        fimpl,
        arg_matches,
        picked_type,
        return_type,
    }
}

/// Folds common-type inference over the region's actual types in position
/// order, skipping undetermined arguments. An empty or fully-skipped region,
/// or any step with no common type, yields `None`.
fn pick_common_type<C>(catalog: &C, types: &[Option<TypeId>]) -> Option<TypeId>
where
    C: FuncCatalog + ?Sized,
{
    let mut common = None;
    for typ in types.iter().copied().flatten() {
        common = Some(match common {
            None => typ,
            Some(prev) => catalog.common_type(prev, typ)?,
        });
    }
    common
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::catalog::Catalog;

    use super::*;

    fn class(x: u8) -> ArgMatch {
        match x {
            0 => ArgMatch::Exact,
            1 => ArgMatch::ImplicitCast,
            _ => ArgMatch::ExplicitCast,
        }
    }

    #[test]
    fn test_param_list_indexing() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");
        let text = builder.register_type("text");

        let exact = params!(int4, text);
        assert_eq!(exact[0], ParamType::Plain(int4));
        assert_eq!(exact[1], ParamType::Plain(text));

        let variadic = ParamList::Variadic {
            fixed: vec![text.into()],
            repeated: int4.into(),
        };
        assert_eq!(variadic[0], ParamType::Plain(text));
        assert_eq!(variadic[1], ParamType::Plain(int4));
        assert_eq!(variadic[7], ParamType::Plain(int4));

        let picking = ParamList::Picking {
            fixed: vec![ParamType::Any],
        };
        assert_eq!(picking[0], ParamType::Any);
        assert_eq!(picking[3], ParamType::Any);
    }

    #[test]
    fn test_param_list_arity() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");

        let exact = params!(int4, int4);
        assert!(exact.accepts_args(2));
        assert!(!exact.accepts_args(1));
        assert!(!exact.accepts_args(3));
        assert_eq!(exact.arity(), Arity::Exactly(2));

        let variadic = params!(int4...);
        assert!(variadic.accepts_args(0));
        assert!(variadic.accepts_args(5));
        assert_eq!(variadic.arity(), Arity::AtLeast(0));

        let picking = ParamList::Picking {
            fixed: vec![ParamType::Any],
        };
        assert!(!picking.accepts_args(0));
        assert!(picking.accepts_args(1));
        assert!(picking.accepts_args(4));
        assert_eq!(picking.arity(), Arity::AtLeast(1));
        assert_eq!(picking.picking_start(), Some(1));
    }

    #[test]
    fn test_argument_classification() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");
        let int8 = builder.register_type("int8");
        let text = builder.register_type("text");
        builder.register_cast(int4, int8, CastContext::Implicit);
        builder.register_cast(int8, int4, CastContext::Explicit);
        let catalog = builder.build();

        let fimpl = FuncImpl {
            params: params!(int4, int4, ParamType::Any),
            return_type: ReturnType::Fixed(int4),
        };

        assert_eq!(
            argument_matches(&catalog, &fimpl, &[Some(int4), Some(int4), Some(text)]),
            Some(vec![ArgMatch::Exact, ArgMatch::Exact, ArgMatch::Exact]),
        );
        assert_eq!(
            argument_matches(&catalog, &fimpl, &[Some(int8), Some(int4), None]),
            Some(vec![ArgMatch::ExplicitCast, ArgMatch::Exact, ArgMatch::Exact]),
        );
        // No text → int4 edge.
        assert_eq!(
            argument_matches(&catalog, &fimpl, &[Some(text), Some(int4), Some(int4)]),
            None,
        );
        // An unknown actual never satisfies a concrete parameter.
        assert_eq!(
            argument_matches(&catalog, &fimpl, &[None, Some(int4), Some(int4)]),
            None,
        );

        let widening = FuncImpl {
            params: params!(int8, int8),
            return_type: ReturnType::Fixed(int8),
        };
        assert_eq!(
            argument_matches(&catalog, &widening, &[Some(int4), Some(int8)]),
            Some(vec![ArgMatch::ImplicitCast, ArgMatch::Exact]),
        );
    }

    #[test]
    fn test_specificity_order() {
        use ArgMatch::*;
        assert!(strictly_more_specific(&[Exact, Exact], &[Exact, ImplicitCast]));
        assert!(strictly_more_specific(&[Exact, ImplicitCast], &[ImplicitCast, ImplicitCast]));
        assert!(!strictly_more_specific(&[Exact, Exact], &[Exact, Exact]));
        // Incomparable: each is better at one position.
        assert!(!strictly_more_specific(&[Exact, ImplicitCast], &[ImplicitCast, Exact]));
        assert!(!strictly_more_specific(&[ImplicitCast, Exact], &[Exact, ImplicitCast]));
        assert!(at_least_as_specific(&[Exact, Exact], &[Exact, Exact]));
    }

    #[test]
    fn test_common_type_folding_skips_unknowns() {
        let mut builder = Catalog::builder();
        let int4 = builder.register_type("int4");
        let int8 = builder.register_type("int8");
        builder.register_cast(int4, int8, CastContext::Implicit);
        let catalog = builder.build();

        assert_eq!(pick_common_type(&catalog, &[]), None);
        assert_eq!(pick_common_type(&catalog, &[None, None]), None);
        assert_eq!(pick_common_type(&catalog, &[Some(int4)]), Some(int4));
        assert_eq!(
            pick_common_type(&catalog, &[None, Some(int4), Some(int8)]),
            Some(int8),
        );
        assert_eq!(
            pick_common_type(&catalog, &[Some(int8), None, Some(int4)]),
            Some(int8),
        );
    }

    proptest! {
        #[test]
        fn strict_specificity_is_a_strict_partial_order(
            pairs in proptest::collection::vec((0u8..3, 0u8..3), 0..8)
        ) {
            let a: Vec<ArgMatch> = pairs.iter().map(|(x, _)| class(*x)).collect();
            let b: Vec<ArgMatch> = pairs.iter().map(|(_, y)| class(*y)).collect();
            // Irreflexive and antisymmetric.
            prop_assert!(!strictly_more_specific(&a, &a));
            prop_assert!(
                !(strictly_more_specific(&a, &b) && strictly_more_specific(&b, &a))
            );
        }
    }
}
