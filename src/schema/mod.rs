//! Schema registry for tax-filing-unit record samples
//!
//! This module is the single source of truth for which input variables the
//! calculator can use, which of those must be present, which are
//! integer-typed, and which variables are calculated downstream and therefore
//! zero-initialized rather than read. The sets are process-wide immutable
//! configuration.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

/// Input variables recognized by the tax calculations
///
/// Columns of the raw sample outside this set are ignored (recorded by name
/// only); members absent from the raw sample are zero-initialized.
pub static USABLE_READ_VARS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        "DSI", "EIC", "FLPDYR",
        "f2441", "f6251", "n24", "XTOT",
        "e00200", "e00300", "e00400", "e00600", "e00650", "e00700", "e00800",
        "e00200p", "e00200s",
        "e00900", "e01100", "e01200", "e01400", "e01500", "e01700",
        "e00900p", "e00900s",
        "e02000", "e02100", "e02300", "e02400", "e03150", "e03210",
        "e02100p", "e02100s",
        "e03220", "e03230", "e03270", "e03240", "e03290",
        "e03400", "e03500",
        "e07240", "e07260", "e07300",
        "e07400", "e07600", "p08000",
        "e09700", "e09800", "e09900",
        "e11200",
        "e17500", "e18400", "e18500",
        "e19200", "e19800", "e20100",
        "e20400", "e20500", "p22250",
        "p23250", "e24515", "e24518",
        "p25470",
        "e26270",
        "e27200", "e32800", "e03300",
        "e58990",
        "e62900",
        "p87521", "e87530",
        "MARS", "MIDR", "RECID", "filer", "cmbtp",
        "age_head", "age_spouse", "blind_head", "blind_spouse",
        "nu13", "elderly_dependent",
        "s006", "nu05",
    ]
    .into_iter()
    .collect()
});

/// Input variables that must be present after classification
pub static MUST_READ_VARS: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| ["RECID", "MARS"].into_iter().collect());

/// The subset of [`USABLE_READ_VARS`] stored as `i64` rather than `f64`
pub static INTEGER_READ_VARS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        "DSI", "EIC", "FLPDYR",
        "f2441", "f6251",
        "n24", "XTOT",
        "MARS", "MIDR", "RECID", "filer",
        "age_head", "age_spouse", "blind_head", "blind_spouse",
        "nu13", "elderly_dependent",
    ]
    .into_iter()
    .collect()
});

/// Variables written by the downstream tax calculations
///
/// All of these are zero-initialized at load time, never read from the raw
/// sample.
pub static CALCULATED_VARS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        "_exact",
        "c07200",
        "c00100", "pre_c04600", "c04600",
        "c04470", "c21060", "c21040", "c17000",
        "c18300", "c20800", "c02900", "c02900_in_ei", "c23650",
        "c01000", "c02500", "c19700", "invinc_ec_base", "invinc_agi_ec",
        "_sey", "_earned", "_earned_p", "_earned_s",
        "ymod", "ymod1",
        "c04800", "c19200", "c20500",
        "_taxbc", "_standard", "dwks10", "dwks13", "dwks14", "dwks19",
        "c05700",
        "c05800",
        "c07180",
        "c07230", "prectc", "c07220", "c59660",
        "c09200", "c07100", "_eitc",
        "_payrolltax", "ptax_was", "setax", "c03260", "ptax_amc", "ptax_oasdi",
        "_sep", "_num",
        "c05200",
        "c62100",
        "c09600",
        "ID_Casualty_frt_in_pufcsv_year",
        "c11070",
        "c10960", "c87668",
        "NIIT",
        "_iitax", "_refund", "ctc_new", "lumpsum_tax",
        "_expanded_income", "c07300", "c07400",
        "c07600", "c07240", "c07260", "c08000",
        "_surtax", "_combined", "personal_credit", "fstax", "care_deduction",
        "dep_credit",
    ]
    .into_iter()
    .collect()
});

/// The calculated variables stored as `i64`
pub static INTEGER_CALCULATED_VARS: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| ["_num", "_sep", "_exact"].into_iter().collect());

/// Calculated variables that change from one calculation pass to the next
///
/// Excludes the integer bookkeeping scalars and the casualty-floor constant,
/// which stay fixed for the life of the sample.
pub static CHANGING_CALCULATED_VARS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    CALCULATED_VARS
        .iter()
        .copied()
        .filter(|name| {
            !INTEGER_CALCULATED_VARS.contains(name) && *name != "ID_Casualty_frt_in_pufcsv_year"
        })
        .collect()
});

/// Whether the named variable carries an integer column
#[must_use]
pub fn is_integer_var(name: &str) -> bool {
    INTEGER_READ_VARS.contains(name) || INTEGER_CALCULATED_VARS.contains(name)
}
