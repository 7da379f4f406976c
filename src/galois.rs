//! GF(2^8) byte arithmetic.
//!
//! Field: `GF(2)[x] / (x^8 + x^4 + x^3 + x^2 + 1)` (primitive polynomial
//! `0x11D`), generator `2`. Addition and subtraction are XOR; multiplication
//! and division go through process-wide LOG/EXP/MUL_TABLE lookup tables
//! built once, lazily, on first use.

use once_cell::sync::OnceCell;

/// Primitive polynomial `x^8 + x^4 + x^3 + x^2 + 1`, without the leading
/// `x^8` term (`0x11D` with the top bit implicit).
const GF_POLYNOMIAL: u16 = 0x11D;

/// Generator element of the field.
const GENERATOR: u8 = 2;

const FIELD_SIZE: usize = 256;

/// `LOG[a] = i` where `generator^i = a`, for `a != 0`. `LOG[0]` is `0`
/// (never consulted: every caller special-cases zero operands first).
pub type Log = [u8; FIELD_SIZE];

/// `EXP[i] = generator^i`, duplicated to length `2 * (FIELD_SIZE - 1)` so
/// that `EXP[LOG[a] as usize + LOG[b] as usize]` needs no modulo reduction.
pub type Exp = [u8; 2 * (FIELD_SIZE - 1)];

/// Precomputed product of every byte pair: `MUL_TABLE[a][b] = mul(a, b)`.
pub type MulTable = [[u8; FIELD_SIZE]; FIELD_SIZE];

struct Tables {
    log: Box<Log>,
    exp: Box<Exp>,
    mul_table: Box<MulTable>,
}

static TABLES: OnceCell<Tables> = OnceCell::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut log = Box::new([0u8; FIELD_SIZE]);
        let mut exp = Box::new([0u8; 2 * (FIELD_SIZE - 1)]);

        let mut x: u16 = 1;
        for i in 0..(FIELD_SIZE - 1) {
            exp[i] = x as u8;
            log[x as usize] = i as u8;

            x <<= 1;
            if x & FIELD_SIZE as u16 != 0 {
                x ^= GF_POLYNOMIAL;
            }
        }
        for i in (FIELD_SIZE - 1)..exp.len() {
            exp[i] = exp[i - (FIELD_SIZE - 1)];
        }

        let mut mul_table = Box::new([[0u8; FIELD_SIZE]; FIELD_SIZE]);
        for a in 0..FIELD_SIZE {
            for b in 0..FIELD_SIZE {
                mul_table[a][b] = mul_uncached(a as u8, b as u8, &log, &exp);
            }
        }

        Tables {
            log,
            exp,
            mul_table,
        }
    })
}

#[inline(always)]
fn mul_uncached(a: u8, b: u8, log: &Log, exp: &Exp) -> u8 {
    if a == 0 || b == 0 {
        0
    } else {
        exp[log[a as usize] as usize + log[b as usize] as usize]
    }
}

/// Returns the process-wide `LOG` and `EXP` tables, building them on first
/// use.
pub fn log_exp() -> (&'static Log, &'static Exp) {
    let t = tables();
    (&t.log, &t.exp)
}

/// Returns the process-wide 256x256 multiplication table, building it (and
/// the `LOG`/`EXP` tables it depends on) on first use.
pub fn mul_table() -> &'static MulTable {
    &tables().mul_table
}

/// `a XOR b`, the field's addition.
#[inline(always)]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// `a XOR b`, the field's subtraction (identical to addition in
/// characteristic 2).
#[inline(always)]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field multiplication: `0` if either operand is `0`, else
/// `EXP[LOG[a] + LOG[b]]`.
#[inline(always)]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        0
    } else {
        let (log, exp) = log_exp();
        exp[log[a as usize] as usize + log[b as usize] as usize]
    }
}

/// Field division: `a / b`.
///
/// # Panics
///
/// Panics if `b == 0`. Callers that need a checked variant should test
/// `b == 0` themselves first, the same way [`crate::matrix::Matrix::invert`]
/// does before calling this.
#[inline(always)]
pub fn div(a: u8, b: u8) -> u8 {
    assert!(b != 0, "division by zero in GF(2^8)");
    if a == 0 {
        0
    } else {
        let (log, exp) = log_exp();
        let la = log[a as usize] as i32;
        let lb = log[b as usize] as i32;
        exp[(la - lb + 255) as usize]
    }
}

/// Field exponentiation: `a^n`. `exp(a, 0) == 1` for all `a` including `0`;
/// `exp(0, n) == 0` for `n >= 1`.
pub fn exp(a: u8, n: u32) -> u8 {
    if n == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }

    let (log, exp_table) = log_exp();
    let product = (log[a as usize] as u64) * (n as u64) % 255;
    exp_table[product as usize]
}

/// The field's generator element, `2`.
pub const fn generator() -> u8 {
    GENERATOR
}
