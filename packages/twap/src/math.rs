use cosmwasm_std::{
    Decimal256, Int128, Int256, SignedDecimal256, StdError, StdResult, Uint128, Uint256,
};

/// Base of the logarithm folded into the geometric accumulator.
pub const GEOMETRIC_TWAP_MATH_BASE: u128 = 2;

/// Number of atomics in one unit of [`Decimal256`] / [`SignedDecimal256`].
const DECIMAL_FRACTIONAL: u128 = 1_000_000_000_000_000_000;
/// Working precision of the log / pow routines (36 fractional digits).
const WORKING_FRACTIONAL: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;
/// ln(2) with 36 fractional digits.
const LN_2: u128 = 693_147_180_559_945_309_417_232_121_458_176_568;
/// Number of binary digits extracted for the fractional part of a logarithm.
const LOG_FRACTION_BITS: u32 = 64;
/// Largest integer exponent `twap_pow` will try before reporting an overflow.
const MAX_POW_EXPONENT: i128 = 255;

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x      Generic helpers      x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Returns the absolute difference `|a - b|` and whether `a - b` was negative.
pub fn sub_sign(a: Decimal256, b: Decimal256) -> (Decimal256, bool) {
    if a >= b {
        (a - b, false)
    } else {
        (b - a, true)
    }
}

/// Converts a whole number of milliseconds into a [`Decimal256`].
pub fn decimal_from_millis(millis: u64) -> Decimal256 {
    Decimal256::from_ratio(millis, 1u64)
}

/// Converts a signed whole number of milliseconds into a [`SignedDecimal256`].
pub fn signed_decimal_from_millis(millis: i128) -> StdResult<SignedDecimal256> {
    let atomics = millis
        .checked_mul(DECIMAL_FRACTIONAL as i128)
        .ok_or_else(|| StdError::generic_err(format!("{} milliseconds overflow", millis)))?;
    Ok(SignedDecimal256::new(Int256::from(atomics)))
}

// ----------------x----------------x----------------x----------------x----------------x----------------
// ----------------x----------------x      Logarithm & power      x----------------x----------------
// ----------------x----------------x----------------x----------------x----------------x----------------

/// ## Description
/// Computes `log2(x)` for a strictly positive `x`.
///
/// The argument is lifted to 36 fractional digits, normalised into `[1, 2)` by shifting (which
/// yields the integer part of the logarithm) and the fractional part is extracted bit by bit
/// through repeated squaring. The result is truncated to 18 fractional digits, so identical
/// inputs always produce identical outputs.
///
/// ## Params
/// * **x** is an object of type [`Decimal256`], the value whose logarithm is taken.
pub fn twap_log(x: Decimal256) -> StdResult<SignedDecimal256> {
    if x.is_zero() {
        return Err(StdError::generic_err("twap_log: logarithm of zero is undefined"));
    }

    let one = Uint256::from(WORKING_FRACTIONAL);
    let two = one + one;

    let mut y = x.atomics().checked_mul(Uint256::from(DECIMAL_FRACTIONAL))?;

    let mut integer_part: i128 = 0;
    while y >= two {
        y = y >> 1;
        integer_part += 1;
    }
    while y < one {
        y = y << 1;
        integer_part -= 1;
    }

    let mut fraction = Uint256::zero();
    let mut bit = one >> 1;
    for _ in 0..LOG_FRACTION_BITS {
        y = y.checked_mul(y)? / one;
        if y >= two {
            y = y >> 1;
            fraction += bit;
        }
        bit = bit >> 1;
    }

    let fraction = Uint128::try_from(fraction / Uint256::from(DECIMAL_FRACTIONAL))?.u128() as i128;
    let atomics = integer_part * DECIMAL_FRACTIONAL as i128 + fraction;
    Ok(SignedDecimal256::new(Int256::from(atomics)))
}

/// ## Description
/// Computes `2^y`.
///
/// `y` is split into `floor(y)` and a fraction in `[0, 1)`. `2^fraction` is evaluated as
/// `exp(fraction * ln 2)` with a Taylor series at 36 fractional digits and then shifted by the
/// integer part. Results too small for 18 fractional digits come back as zero, results that do
/// not fit a [`Decimal256`] are an error.
///
/// ## Params
/// * **y** is an object of type [`SignedDecimal256`], the exponent.
pub fn twap_pow(y: SignedDecimal256) -> StdResult<Decimal256> {
    let atomics = Int128::try_from(y.atomics())
        .map_err(|_| StdError::generic_err(format!("twap_pow: exponent {} out of range", y)))?
        .i128();

    let scale = DECIMAL_FRACTIONAL as i128;
    let integer_part = atomics.div_euclid(scale);
    let fraction = atomics.rem_euclid(scale) as u128;

    if integer_part > MAX_POW_EXPONENT {
        return Err(StdError::generic_err(format!("twap_pow: 2^{} overflows", y)));
    }
    if integer_part < -MAX_POW_EXPONENT {
        return Ok(Decimal256::zero());
    }

    let one = Uint256::from(WORKING_FRACTIONAL);
    let z = Uint256::from(fraction).checked_mul(Uint256::from(LN_2))? / Uint256::from(DECIMAL_FRACTIONAL);

    // exp(z) for z in [0, ln 2)
    let mut sum = one;
    let mut term = one;
    let mut k = 1u128;
    loop {
        term = term.checked_mul(z)? / one / Uint256::from(k);
        if term.is_zero() {
            break;
        }
        sum += term;
        k += 1;
    }

    let scaled = if integer_part >= 0 {
        let factor = Uint256::from(2u128).checked_pow(integer_part as u32)?;
        sum.checked_mul(factor)?
    } else {
        sum >> ((-integer_part) as u32)
    };

    Ok(Decimal256::new(scaled / Uint256::from(DECIMAL_FRACTIONAL)))
}
