use std::ops::Deref;

use super::galois::{EXP_TABLE, G, LOG_TABLE};
use crate::common::metadata::{ECLevel, Version};

// ECC: Error Correction Codeword generator
pub fn compute_ecc(data: &[u8], version: Version, ec_level: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
    let data_blocks = blockify(data, version, ec_level);

    let ecc_size_per_block = version.ecc_per_block(ec_level);
    let gen_poly = generator_polynomial(ecc_size_per_block);
    let ecc_blocks =
        data_blocks.iter().map(|b| ecc_per_block(b, &gen_poly)).collect::<Vec<_>>();

    (data_blocks, ecc_blocks)
}

// Short blocks first, then long blocks one codeword larger
pub fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
    let (block1_size, block1_count, block2_size, block2_count) =
        version.data_codewords_per_block(ec_level);

    let total_blocks = block1_count + block2_count;
    let total_block1_size = block1_size * block1_count;
    let total_size = total_block1_size + block2_size * block2_count;

    debug_assert!(
        total_size == data.len(),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        total_size
    );

    let mut data_blocks = Vec::with_capacity(total_blocks);
    data_blocks.extend(data[..total_block1_size].chunks(block1_size));
    if block2_size > 0 {
        data_blocks.extend(data[total_block1_size..].chunks(block2_size));
    }
    data_blocks
}

pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}

// Log of the coefficients of (x - a^0)(x - a^1)...(x - a^(n-1)), leading 1 excluded
pub fn generator_polynomial(ecc_count: usize) -> Vec<u8> {
    let mut poly = vec![G(1)];
    for i in 0..ecc_count {
        let root = G::gen_pow(i);
        let mut next = poly.clone();
        next.push(G(0));
        for (j, &coeff) in poly.iter().enumerate() {
            next[j + 1] += coeff * root;
        }
        poly = next;
    }
    poly[1..].iter().map(|g| g.log() as u8).collect()
}

// Performs polynomial long division with data polynomial(num)
// and generator polynomial(den) to compute remainder polynomial,
// the coefficients of which are the ecc
pub(crate) fn ecc_per_block(block: &[u8], gen_poly: &[u8]) -> Vec<u8> {
    let len = block.len();
    let ecc_count = gen_poly.len();

    let mut res = block.to_vec();
    res.resize(len + ecc_count, 0);

    for i in 0..len {
        let lead_coeff = res[i] as usize;
        if lead_coeff == 0 {
            continue;
        }

        let log_lead_coeff = LOG_TABLE[lead_coeff] as usize;
        for (u, v) in res[i + 1..].iter_mut().zip(gen_poly.iter()) {
            let mut log_sum = *v as usize + log_lead_coeff;
            debug_assert!(log_sum < 510, "Log sum has crossed 510: {log_sum}");
            if log_sum >= 255 {
                log_sum -= 255;
            }
            *u ^= EXP_TABLE[log_sum];
        }
    }

    res.split_off(len)
}

// Correctable codeword errors, less the misdecode protection codewords of small symbols
pub fn error_correction_capacity(version: Version, ec_level: ECLevel) -> usize {
    let p = match (*version, ec_level) {
        (1, ECLevel::L) => 3,
        (2, ECLevel::L) | (1, ECLevel::M) => 2,
        (1, _) | (3, ECLevel::L) => 1,
        _ => 0,
    };

    let ec_bytes = version.block_count(ec_level) * version.ecc_per_block(ec_level);

    (ec_bytes - p) / 2
}

#[cfg(test)]
mod ec_tests {
    use test_case::test_case;

    use super::{
        blockify, compute_ecc, ecc_per_block, error_correction_capacity, generator_polynomial,
        interleave,
    };
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_generator_polynomial() {
        // Log form of x^7 + a^87 x^6 + a^229 x^5 + a^146 x^4 + a^149 x^3 + a^238 x^2 + a^102 x + a^21
        assert_eq!(generator_polynomial(7), vec![87, 229, 146, 149, 238, 102, 21]);
        assert_eq!(generator_polynomial(10), vec![251, 67, 46, 61, 118, 70, 64, 94, 32, 45]);
    }

    #[test]
    fn test_poly_mod_1() {
        let res = ecc_per_block(
            b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11",
            &generator_polynomial(10),
        );
        assert_eq!(&*res, b"\xc4#'w\xeb\xd7\xe7\xe2]\x17");
    }

    #[test]
    fn test_poly_mod_2() {
        let res = ecc_per_block(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec", &generator_polynomial(13));
        assert_eq!(&*res, b"\xa8H\x16R\xd96\x9c\x00.\x0f\xb4z\x10");
    }

    #[test]
    fn test_poly_mod_3() {
        let res = ecc_per_block(b"CUF\x86W&U\xc2w2\x06\x12\x06g&", &generator_polynomial(18));
        assert_eq!(&*res, b"\xd5\xc7\x0b-s\xf7\xf1\xdf\xe5\xf8\x9au\x9aoV\xa1o'");
    }

    #[test]
    fn test_numeric_payload_ecc() {
        let data = [0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11];
        let (_, ecc) = compute_ecc(&data, Version::new(1).unwrap(), ECLevel::M);
        assert_eq!(ecc, vec![vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]]);
    }

    #[test]
    fn test_add_ec_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected_ecc = [b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17"];
        let (data, ecc) = compute_ecc(msg, Version::new(1).unwrap(), ECLevel::M);
        assert_eq!(data, vec![&msg[..]]);
        assert_eq!(&*ecc, expected_ecc);
    }

    #[test]
    fn test_add_ec_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let (data, ecc) = compute_ecc(msg, Version::new(5).unwrap(), ECLevel::Q);
        assert_eq!(data.iter().map(|b| b.len()).collect::<Vec<_>>(), vec![15, 15, 16, 16]);
        assert_eq!(&*ecc, &expected_ec[..]);
    }

    #[test]
    fn test_blockify_order() {
        let data = (0..62u8).collect::<Vec<_>>();
        let blocks = blockify(&data, Version::new(5).unwrap(), ECLevel::Q);
        assert_eq!(blocks[0][0], 0);
        assert_eq!(blocks[1][0], 15);
        assert_eq!(blocks[2][0], 30);
        assert_eq!(blocks[3][0], 46);
        assert_eq!(blocks[3][15], 61);
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
    }

    #[test_case(1, ECLevel::L, 2)]
    #[test_case(1, ECLevel::M, 4)]
    #[test_case(1, ECLevel::H, 8)]
    #[test_case(5, ECLevel::Q, 36)]
    #[test_case(40, ECLevel::H, 1215)]
    fn test_error_correction_capacity(v: usize, ecl: ECLevel, exp: usize) {
        assert_eq!(error_correction_capacity(Version::new(v).unwrap(), ecl), exp);
    }
}
