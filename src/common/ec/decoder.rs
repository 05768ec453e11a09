use super::{galois::G, Block, MAX_BLOCK_SIZE, MAX_EC_SIZE};
use crate::common::error::{QRError, QRResult};

// Rectifier
//------------------------------------------------------------------------------

impl Block {
    // Corrects up to ec_len / 2 codeword errors in place and returns the data codewords
    pub fn rectify(&mut self) -> QRResult<&[u8]> {
        // Compute syndromes
        let synd = match self.syndromes() {
            Ok(()) => return Ok(self.data()),
            Err(s) => s,
        };

        // Error locator polynomial
        let (sig, deg) = self.berlekamp_massey(&synd);
        if 2 * deg > self.ec_len() {
            return Err(QRError::TooManyErrors);
        }
        let err_loc = self.chien_search(&sig);
        if err_loc.iter().take(self.len).filter(|&&e| e).count() != deg {
            return Err(QRError::TooManyErrors);
        }

        // Sigma derivative
        let mut dsig = [G(0); MAX_EC_SIZE];
        for i in (1..MAX_EC_SIZE).step_by(2) {
            dsig[i - 1] = sig[i];
        }

        // Error evaluator
        let omg = self.omega(&synd, &sig);

        // Error magnitude
        let err_mag = self.forney(&omg, &dsig, &err_loc)?;

        // Rectify errors by XORing data with magnitude
        for (i, &g) in err_mag.iter().take(self.len).enumerate() {
            self.data[i] = (G(self.data[i]) + g).into();
        }

        match self.syndromes() {
            Ok(()) => Ok(self.data()),
            Err(_) => Err(QRError::TooManyErrors),
        }
    }

    // S_i = r(a^i), the last codeword being the constant term
    fn syndromes(&self) -> Result<(), [G; MAX_EC_SIZE]> {
        let mut synd = [G(0); MAX_EC_SIZE];
        for (i, s) in synd.iter_mut().take(self.ec_len()).enumerate() {
            *s = eval_poly(self.full().iter().rev().map(|&b| G(b)), G::gen_pow(i));
        }

        if synd.iter().all(|s| s.is_zero()) {
            Ok(())
        } else {
            Err(synd)
        }
    }

    // Sigma polynomial and its degree
    fn berlekamp_massey(&self, synd: &[G; MAX_EC_SIZE]) -> ([G; MAX_EC_SIZE], usize) {
        let mut l = 0usize;
        let mut m = 1usize;
        let mut b = G(1);
        let mut cx = [G(0); MAX_EC_SIZE];
        let mut bx = [G(0); MAX_EC_SIZE];
        cx[0] = G(1);
        bx[0] = G(1);

        for n in 0..self.ec_len() {
            // Calculate discrepancy
            let mut d = synd[n];
            for i in 1..=l {
                d += cx[i] * synd[n - i];
            }

            if d.is_zero() {
                m += 1;
                continue;
            }

            let tx = cx;
            let scale = d / b;
            for i in 0..MAX_EC_SIZE - m {
                cx[i + m] += scale * bx[i];
            }

            if 2 * l <= n {
                bx = tx;
                l = n + 1 - l;
                b = d;
                m = 1;
            } else {
                m += 1;
            }
        }
        (cx, l)
    }

    // Marks codeword i (counted from the front) when sigma(a^-p) = 0, p being its power
    fn chien_search(&self, sig: &[G; MAX_EC_SIZE]) -> [bool; MAX_BLOCK_SIZE] {
        let mut err_loc = [false; MAX_BLOCK_SIZE];
        for (p, e) in err_loc[..self.len].iter_mut().rev().enumerate() {
            *e = eval_poly(sig.iter().copied(), G::gen_pow(255 - p)).is_zero();
        }
        err_loc
    }

    // Error evaluator polynomial, S(x) * sigma(x) mod x^ec_len
    fn omega(&self, synd: &[G; MAX_EC_SIZE], sig: &[G; MAX_EC_SIZE]) -> [G; MAX_EC_SIZE] {
        let t = self.ec_len();
        let mut omg = [G(0); MAX_EC_SIZE];
        for i in 0..t {
            for j in 0..t - i {
                omg[i + j] += synd[i] * sig[j];
            }
        }
        omg
    }

    // e = X * omega(X^-1) / sigma'(X^-1) for error location X = a^p
    fn forney(
        &self,
        omg: &[G; MAX_EC_SIZE],
        dsig: &[G; MAX_EC_SIZE],
        err_loc: &[bool; MAX_BLOCK_SIZE],
    ) -> QRResult<[G; MAX_BLOCK_SIZE]> {
        let mut mag = [G(0); MAX_BLOCK_SIZE];
        for (p, &is_err) in err_loc[..self.len].iter().rev().enumerate() {
            if !is_err {
                continue;
            }
            let xinv = G::gen_pow(255 - p);
            let omg_x = eval_poly(omg.iter().copied(), xinv);
            let sig_x = eval_poly(dsig.iter().copied(), xinv);
            if sig_x.is_zero() {
                return Err(QRError::TooManyErrors);
            }
            mag[self.len - 1 - p] = G::gen_pow(p) * omg_x / sig_x;
        }
        Ok(mag)
    }
}

fn eval_poly(poly: impl Iterator<Item = G>, x: G) -> G {
    let mut res = G(0);
    let mut xpow = G(1);
    for coeff in poly {
        res += coeff * xpow;
        xpow *= x;
    }
    res
}


// Rectifier for format and version infos
pub fn rectify_info(
    info: u32,
    valid_numbers: impl Iterator<Item = u32>,
    err_capacity: u32,
) -> Option<u32> {
    valid_numbers
        .min_by_key(|&n| (info ^ n).count_ones())
        .filter(|&n| (info ^ n).count_ones() <= err_capacity)
}

#[cfg(test)]
mod info_rectifier_tests {
    use super::rectify_info;
    use crate::common::metadata::{all_format_infos, all_version_infos};

    #[test]
    fn test_rectify_format_info() {
        assert_eq!(rectify_info(0x5412 ^ 0b101, all_format_infos(), 3), Some(0x5412));
        assert_eq!(rectify_info(0x77C4 ^ 0b1_0000_0000_0011, all_format_infos(), 3), Some(0x77C4));
        assert_eq!(rectify_info(0, all_format_infos(), 3), None);
    }

    #[test]
    fn test_rectify_version_info() {
        assert_eq!(rectify_info(0x07C94 ^ 0x10001, all_version_infos(), 3), Some(0x07C94));
    }
}
