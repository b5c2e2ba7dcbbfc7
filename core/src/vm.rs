//! Value multiplicity enumeration.
//!
//! Looking at the standard dictionary, only a small closed set of
//! multiplicities ever occurs: fixed counts, bounded ranges,
//! and unbounded forms whose actual count is derived from the
//! encoded value itself.

use std::fmt;
use std::str::FromStr;

/// The multiplicity of an attribute's value:
/// how many repetitions of the base value type one value field may hold.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub enum VM {
    /// Unresolved multiplicity,
    /// used by dictionary entries which do not constrain the count
    /// (such as generic private attributes).
    VM0,
    /// Exactly 1
    VM1,
    /// Exactly 2
    VM2,
    /// Exactly 3
    VM3,
    /// Exactly 4
    VM4,
    /// Exactly 5
    VM5,
    /// Exactly 6
    VM6,
    /// Exactly 8
    VM8,
    /// Exactly 16
    VM16,
    /// Exactly 24
    VM24,
    /// 1 or 2
    VM1_2,
    /// 1 to 3
    VM1_3,
    /// 1 to 8
    VM1_8,
    /// 1 to 32
    VM1_32,
    /// 1 to 99
    VM1_99,
    /// 1 or more
    VM1_N,
    /// 2 or more
    VM2_N,
    /// an even count of 2 or more
    VM2_2N,
    /// 3 or more
    VM3_N,
    /// a multiple of 3
    VM3_3N,
}

impl VM {
    /// Check whether a concrete value count satisfies this multiplicity.
    ///
    /// The count is typically derived from the encoded value field:
    /// byte length divided by scalar width for binary representations,
    /// or one more than the number of backslash separators for
    /// character data.
    pub fn is_valid(self, count: usize) -> bool {
        use VM::*;
        match self {
            VM0 => true,
            VM1 => count == 1,
            VM2 => count == 2,
            VM3 => count == 3,
            VM4 => count == 4,
            VM5 => count == 5,
            VM6 => count == 6,
            VM8 => count == 8,
            VM16 => count == 16,
            VM24 => count == 24,
            VM1_2 => (1..=2).contains(&count),
            VM1_3 => (1..=3).contains(&count),
            VM1_8 => (1..=8).contains(&count),
            VM1_32 => (1..=32).contains(&count),
            VM1_99 => (1..=99).contains(&count),
            VM1_N => count >= 1,
            VM2_N => count >= 2,
            VM2_2N => count >= 2 && count % 2 == 0,
            VM3_N => count >= 3,
            VM3_3N => count >= 3 && count % 3 == 0,
        }
    }

    /// The string form as written in the standard dictionary.
    pub fn as_str(self) -> &'static str {
        use VM::*;
        match self {
            VM0 => "0",
            VM1 => "1",
            VM2 => "2",
            VM3 => "3",
            VM4 => "4",
            VM5 => "5",
            VM6 => "6",
            VM8 => "8",
            VM16 => "16",
            VM24 => "24",
            VM1_2 => "1-2",
            VM1_3 => "1-3",
            VM1_8 => "1-8",
            VM1_32 => "1-32",
            VM1_99 => "1-99",
            VM1_N => "1-n",
            VM2_N => "2-n",
            VM2_2N => "2-2n",
            VM3_N => "3-n",
            VM3_3N => "3-3n",
        }
    }
}

impl FromStr for VM {
    type Err = &'static str;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use VM::*;
        match string {
            "0" => Ok(VM0),
            "1" => Ok(VM1),
            "2" => Ok(VM2),
            "3" => Ok(VM3),
            "4" => Ok(VM4),
            "5" => Ok(VM5),
            "6" => Ok(VM6),
            "8" => Ok(VM8),
            "16" => Ok(VM16),
            "24" => Ok(VM24),
            "1-2" => Ok(VM1_2),
            "1-3" => Ok(VM1_3),
            "1-8" => Ok(VM1_8),
            "1-32" => Ok(VM1_32),
            "1-99" => Ok(VM1_99),
            "1-n" => Ok(VM1_N),
            "2-n" => Ok(VM2_N),
            "2-2n" => Ok(VM2_2N),
            "3-n" => Ok(VM3_N),
            "3-3n" => Ok(VM3_3N),
            _ => Err("no such value multiplicity"),
        }
    }
}

impl fmt::Display for VM {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the number of values held by a value field,
/// given the byte length of the field, the scalar width of
/// the representation, and whether the representation is character data.
///
/// Character data counts backslash separators;
/// binary data divides the byte length by the scalar width.
pub fn value_count(value: &[u8], scalar_width: usize, is_ascii: bool) -> usize {
    if value.is_empty() {
        return 0;
    }
    if is_ascii {
        value.iter().filter(|&&b| b == b'\\').count() + 1
    } else {
        value.len() / scalar_width.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_fixed_and_ranged() {
        assert!(VM::VM1.is_valid(1));
        assert!(!VM::VM1.is_valid(2));
        assert!(VM::VM1_3.is_valid(3));
        assert!(!VM::VM1_3.is_valid(4));
        assert!(VM::VM2_2N.is_valid(6));
        assert!(!VM::VM2_2N.is_valid(5));
        assert!(VM::VM3_3N.is_valid(9));
        assert!(!VM::VM3_3N.is_valid(4));
        // unresolved multiplicity accepts anything
        assert!(VM::VM0.is_valid(17));
    }

    #[test]
    fn vm_round_trips_through_str() {
        for vm in [VM::VM1, VM::VM1_2, VM::VM1_N, VM::VM2_2N, VM::VM3_3N] {
            assert_eq!(vm.as_str().parse::<VM>().unwrap(), vm);
        }
    }

    #[test]
    fn derived_value_counts() {
        assert_eq!(value_count(b"ORIGINAL\\PRIMARY", 1, true), 2);
        assert_eq!(value_count(b"MONOCHROME2 ", 1, true), 1);
        assert_eq!(value_count(&[0x00, 0x02, 0x00, 0x01], 2, false), 2);
        assert_eq!(value_count(&[], 2, false), 0);
    }
}
