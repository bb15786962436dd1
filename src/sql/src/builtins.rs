// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A prebuilt catalog of standard types, casts, and function overloads.
//!
//! Nothing in the resolver consults this module implicitly; the entry
//! point takes whatever catalog it is handed. This is a convenience for
//! embedders and tests that want a realistic catalog without assembling one
//! by hand.

use once_cell::sync::Lazy;

use crate::catalog::Catalog;
use crate::func::{ParamList, ParamType, ReturnType};
use crate::params;
use crate::typeconv::CastContext;

static STANDARD: Lazy<Catalog> = Lazy::new(build_standard);

/// A catalog with PostgreSQL-flavored numeric, string, and date-time types,
/// the usual implicit widening ladder, and a small set of standard
/// functions.
pub fn standard() -> &'static Catalog {
    &STANDARD
}

fn build_standard() -> Catalog {
    use ParamType::Any;

    let mut b = Catalog::builder();

    let bool_ = b.register_type("bool");
    let int2 = b.register_type("int2");
    let int4 = b.register_type("int4");
    let int8 = b.register_type("int8");
    let numeric = b.register_type("numeric");
    let float4 = b.register_type("float4");
    let float8 = b.register_type("float8");
    let date = b.register_type("date");
    let timestamp = b.register_type("timestamp");
    let text = b.register_type("text");

    // Numeric types widen implicitly up the ladder and narrow only on
    // request, as in PostgreSQL.
    let ladder = [int2, int4, int8, numeric, float4, float8];
    for (i, &narrow) in ladder.iter().enumerate() {
        for &wide in &ladder[i + 1..] {
            b.register_cast(narrow, wide, CastContext::Implicit);
            b.register_cast(wide, narrow, CastContext::Explicit);
        }
    }
    b.register_cast(date, timestamp, CastContext::Implicit);
    b.register_cast(timestamp, date, CastContext::Explicit);
    for typ in [bool_, int2, int4, int8, numeric, float4, float8, date, timestamp] {
        b.register_cast(typ, text, CastContext::Explicit);
        b.register_cast(text, typ, CastContext::Explicit);
    }

    b.register_func("abs", params!(int2), ReturnType::Fixed(int2));
    b.register_func("abs", params!(int4), ReturnType::Fixed(int4));
    b.register_func("abs", params!(int8), ReturnType::Fixed(int8));
    b.register_func("abs", params!(numeric), ReturnType::Fixed(numeric));
    b.register_func("abs", params!(float4), ReturnType::Fixed(float4));
    b.register_func("abs", params!(float8), ReturnType::Fixed(float8));

    for op in ["+", "-", "*"] {
        for typ in [int2, int4, int8, numeric, float4, float8] {
            b.register_func(op, params!(typ, typ), ReturnType::Fixed(typ));
        }
    }

    b.register_func("length", params!(text), ReturnType::Fixed(int4));
    b.register_func("lower", params!(text), ReturnType::Fixed(text));
    b.register_func("upper", params!(text), ReturnType::Fixed(text));
    b.register_func("concat", params!(Any...), ReturnType::Fixed(text));
    b.register_func("now", params!(), ReturnType::Fixed(timestamp));
    b.register_func(
        "date_trunc",
        params!(text, timestamp),
        ReturnType::Fixed(timestamp),
    );

    b.register_func(
        "coalesce",
        ParamList::Picking {
            fixed: vec![ParamType::Any],
        },
        ReturnType::Picking,
    );
    for name in ["greatest", "least"] {
        b.register_func(
            name,
            ParamList::Picking { fixed: vec![] },
            ReturnType::Picking,
        );
    }

    b.build()
}

#[cfg(test)]
mod tests {
    use crate::func::select_impl;

    use super::*;

    #[test]
    fn test_standard_types_exist() {
        let catalog = standard();
        for name in ["bool", "int2", "int4", "int8", "float8", "text"] {
            assert!(catalog.type_id(name).is_some(), "missing type {}", name);
        }
    }

    #[test]
    fn test_abs_exact_overloads() {
        let catalog = standard();
        for name in ["int2", "int8", "float4", "numeric"] {
            let typ = catalog.type_id(name).unwrap();
            let resolution = select_impl(catalog, "abs", &[Some(typ)])
                .unwrap()
                .unwrap();
            assert_eq!(resolution.return_type, Some(typ));
        }
    }

    #[test]
    fn test_abs_of_unknown_is_unresolved() {
        // Several implementations, all with concrete parameters, and an
        // argument of undetermined type: nothing survives.
        assert!(select_impl(standard(), "abs", &[None]).unwrap().is_none());
    }

    #[test]
    fn test_concat_accepts_anything() {
        let catalog = standard();
        let date = catalog.type_id("date").unwrap();
        let text = catalog.type_id("text").unwrap();
        for args in [vec![], vec![Some(date), None, Some(text)]] {
            let resolution = select_impl(catalog, "concat", &args).unwrap().unwrap();
            assert_eq!(resolution.return_type, Some(text));
        }
    }

    #[test]
    fn test_greatest_picks_the_wider_type() {
        let catalog = standard();
        let int2 = catalog.type_id("int2").unwrap();
        let float4 = catalog.type_id("float4").unwrap();
        let resolution = select_impl(catalog, "greatest", &[Some(int2), Some(float4)])
            .unwrap()
            .unwrap();
        assert_eq!(resolution.picked_type, Some(float4));
        assert_eq!(resolution.return_type, Some(float4));
    }
}
