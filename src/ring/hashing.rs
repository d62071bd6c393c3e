//! The two fixed hash functions of the ring.
//!
//! Both take the power-of-two term modulo the ring size, so request ids of any magnitude
//! are hashed without overflow.

use super::types::Slot;

/// `2^exp mod modulus` by square-and-multiply.
pub fn pow2_mod(exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }

    let m = modulus as u128;
    let mut result: u128 = 1;
    let mut base: u128 = 2 % m;
    let mut exp = exp;

    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }

    result as u64
}

/// Slot for replica `replica` of the node with `ordinal`: `(i + j + 2^j + 25) mod n`.
pub fn virtual_slot(ordinal: u64, replica: usize, num_slots: usize) -> Slot {
    let n = num_slots as u64;
    let j = replica as u64;
    let sum = (ordinal % n) as u128 + (j % n) as u128 + pow2_mod(j, n) as u128 + 25;
    (sum % n as u128) as Slot
}

/// Target slot of a request: `(r + 2^r + 17) mod n`.
pub fn request_slot(request_id: u64, num_slots: usize) -> Slot {
    let n = num_slots as u64;
    let sum = (request_id % n) as u128 + pow2_mod(request_id, n) as u128 + 17;
    (sum % n as u128) as Slot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow2_mod_small_exponents() {
        assert_eq!(pow2_mod(0, 512), 1);
        assert_eq!(pow2_mod(1, 512), 2);
        assert_eq!(pow2_mod(8, 512), 256);
        assert_eq!(pow2_mod(9, 512), 0);
        assert_eq!(pow2_mod(10, 1000), 24);
    }

    #[test]
    fn test_pow2_mod_modulus_one() {
        assert_eq!(pow2_mod(0, 1), 0);
        assert_eq!(pow2_mod(123, 1), 0);
    }

    #[test]
    fn test_pow2_mod_huge_exponent_matches_cycle() {
        // 2 has order 3 modulo 7: 2, 4, 1, 2, 4, 1, ...
        assert_eq!(pow2_mod(u64::MAX, 7), pow2_mod(u64::MAX % 3, 7));
    }

    #[test]
    fn test_virtual_slot_formula() {
        // S1 on the default ring.
        let slots: Vec<Slot> = (0..9).map(|j| virtual_slot(1, j, 512)).collect();
        assert_eq!(slots, vec![27, 29, 32, 37, 46, 63, 96, 161, 290]);
    }

    #[test]
    fn test_request_slot_formula() {
        assert_eq!(request_slot(0, 512), 18);
        assert_eq!(request_slot(3, 512), 28);
        assert_eq!(request_slot(100, 512), 117);
        assert_eq!(request_slot(u64::MAX, 512), (511 + 17) % 512);
    }

    #[test]
    fn test_hashes_stay_in_range() {
        for n in [1usize, 2, 7, 64, 511, 512] {
            for r in [0u64, 1, 9, 1_000, u64::MAX] {
                assert!(request_slot(r, n) < n);
            }
            for j in 0..12 {
                assert!(virtual_slot(u64::MAX, j, n) < n);
            }
        }
    }
}
