//! Register ABI name table (`$zero`, `$at`, `$v0`, ... `$ra`).

/// Resolves a register name (`$0`..`$31` or an ABI alias) to its index.
pub fn register_index(name: &str) -> Option<usize> {
    let name = name.strip_prefix('$').unwrap_or(name);
    if let Ok(idx) = name.parse::<usize>() {
        if idx < 32 {
            return Some(idx);
        }
        return None;
    }
    ABI_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, idx)| *idx)
}

const ABI_NAMES: &[(&str, usize)] = &[
    ("zero", 0),
    ("at", 1),
    ("v0", 2),
    ("v1", 3),
    ("a0", 4),
    ("a1", 5),
    ("a2", 6),
    ("a3", 7),
    ("t0", 8),
    ("t1", 9),
    ("t2", 10),
    ("t3", 11),
    ("t4", 12),
    ("t5", 13),
    ("t6", 14),
    ("t7", 15),
    ("s0", 16),
    ("s1", 17),
    ("s2", 18),
    ("s3", 19),
    ("s4", 20),
    ("s5", 21),
    ("s6", 22),
    ("s7", 23),
    ("t8", 24),
    ("t9", 25),
    ("k0", 26),
    ("k1", 27),
    ("gp", 28),
    ("sp", 29),
    ("fp", 30),
    ("s8", 30),
    ("ra", 31),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_abi_names() {
        assert_eq!(register_index("$29"), Some(29));
        assert_eq!(register_index("$sp"), Some(29));
        assert_eq!(register_index("$fp"), Some(30));
        assert_eq!(register_index("$s8"), Some(30));
        assert_eq!(register_index("$zero"), Some(0));
    }

    #[test]
    fn rejects_out_of_range_or_unknown() {
        assert_eq!(register_index("$32"), None);
        assert_eq!(register_index("$bogus"), None);
    }
}
