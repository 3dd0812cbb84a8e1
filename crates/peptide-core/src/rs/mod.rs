//! GF(256) Reed-Solomon codec: generator-polynomial encoding and a combined
//! errors-and-erasures decoder (syndrome computation, erasures-aware
//! Berlekamp-Massey, Forney correction). Every peptide-level RS symbol in
//! `peptide_rs` rides on top of this byte-level core.

pub mod peptide_rs;

use crate::error::{PeptideError, Result};

const FIELD_SIZE: usize = 256;
const PRIMITIVE_POLY: u16 = 0x11d;

pub struct GaloisField {
    exp: [u8; FIELD_SIZE * 2],
    log: [u8; FIELD_SIZE],
}

impl GaloisField {
    fn new() -> Self {
        let mut exp = [0u8; FIELD_SIZE * 2];
        let mut log = [0u8; FIELD_SIZE];
        let mut x: u16 = 1;
        for i in 0..255usize {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLY;
            }
        }
        for i in 255..FIELD_SIZE * 2 {
            exp[i] = exp[i - 255];
        }
        GaloisField { exp, log }
    }

    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    #[inline]
    pub fn div(&self, a: u8, b: u8) -> u8 {
        assert!(b != 0, "division by zero in GF(256)");
        if a == 0 {
            return 0;
        }
        self.exp[(self.log[a as usize] as usize + 255 - self.log[b as usize] as usize) % 255]
    }

    #[inline]
    pub fn pow(&self, a: u8, power: i32) -> u8 {
        if a == 0 {
            return if power == 0 { 1 } else { 0 };
        }
        let l = self.log[a as usize] as i32 * power;
        let l = l.rem_euclid(255);
        self.exp[l as usize]
    }

    #[inline]
    pub fn inverse(&self, a: u8) -> u8 {
        self.exp[(255 - self.log[a as usize] as usize) % 255]
    }

    pub fn poly_mul(&self, p: &[u8], q: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; p.len() + q.len() - 1];
        for (i, &pi) in p.iter().enumerate() {
            if pi == 0 {
                continue;
            }
            for (j, &qj) in q.iter().enumerate() {
                out[i + j] ^= self.mul(pi, qj);
            }
        }
        out
    }

    pub fn poly_eval(&self, p: &[u8], x: u8) -> u8 {
        let mut y = p[0];
        for &coef in &p[1..] {
            y = self.mul(y, x) ^ coef;
        }
        y
    }

    pub fn generator_poly(&self, nsym: usize) -> Vec<u8> {
        let mut g = vec![1u8];
        for i in 0..nsym {
            g = self.poly_mul(&g, &[1, self.pow(2, i as i32)]);
        }
        g
    }
}

thread_local! {
    static GF: GaloisField = GaloisField::new();
}

fn with_gf<T>(f: impl FnOnce(&GaloisField) -> T) -> T {
    GF.with(f)
}

/// Systematic RS encode: `data` followed by `nsym` parity bytes.
pub fn rs_encode_msg(data: &[u8], nsym: usize) -> Vec<u8> {
    if nsym == 0 {
        return data.to_vec();
    }
    with_gf(|gf| {
        let generator = gf.generator_poly(nsym);
        let mut msg_out = data.to_vec();
        msg_out.extend(std::iter::repeat(0u8).take(nsym));

        // polynomial division of data (shifted by nsym) by generator
        let mut buf = msg_out.clone();
        for i in 0..data.len() {
            let coef = buf[i];
            if coef != 0 {
                for (j, &g) in generator.iter().enumerate() {
                    buf[i + j] ^= gf.mul(g, coef);
                }
            }
        }
        let mut result = data.to_vec();
        result.extend_from_slice(&buf[data.len()..data.len() + nsym]);
        result
    })
}

fn calc_syndromes(gf: &GaloisField, msg: &[u8], nsym: usize) -> Vec<u8> {
    let mut synd = vec![0u8; nsym + 1];
    for i in 0..nsym {
        synd[i + 1] = gf.poly_eval(msg, gf.pow(2, i as i32));
    }
    synd
}

fn syndromes_all_zero(synd: &[u8]) -> bool {
    synd.iter().all(|&s| s == 0)
}

fn find_erasure_locator(gf: &GaloisField, erase_pos: &[usize]) -> Vec<u8> {
    let mut e_loc = vec![1u8];
    for &pos in erase_pos {
        let term = vec![gf.mul(gf.pow(2, pos as i32), 1), 1];
        e_loc = gf.poly_mul(&e_loc, &term);
    }
    e_loc
}

fn find_error_locator(
    gf: &GaloisField,
    synd: &[u8],
    nsym: usize,
    erase_count: usize,
    erase_loc: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let (mut err_loc, mut old_loc) = if let Some(loc) = erase_loc {
        (loc.to_vec(), loc.to_vec())
    } else {
        (vec![1u8], vec![1u8])
    };

    let synd_shift = if synd.len() > nsym { synd.len() - nsym } else { 0 };

    for i in 0..(nsym - erase_count) {
        let k = if erase_loc.is_some() { erase_count + i + 1 } else { i + 1 };
        let mut delta = synd[k + synd_shift - 1];
        for j in 1..err_loc.len() {
            delta ^= gf.mul(err_loc[err_loc.len() - 1 - j], synd[k + synd_shift - 1 - j]);
        }
        old_loc.push(0);
        if delta != 0 {
            if old_loc.len() > err_loc.len() {
                let new_loc = scale_poly(gf, &old_loc, delta);
                old_loc = scale_poly(gf, &err_loc, gf.inverse(delta));
                err_loc = new_loc;
            }
            let scaled = scale_poly(gf, &old_loc, delta);
            err_loc = poly_add(&err_loc, &scaled);
        }
    }

    while err_loc.first() == Some(&0) {
        err_loc.remove(0);
    }

    let errs = err_loc.len() - 1;
    if errs * 2 - erase_count > nsym {
        return Err(PeptideError::CodecFailure(
            "too many errors to correct".into(),
        ));
    }
    Ok(err_loc)
}

fn scale_poly(gf: &GaloisField, p: &[u8], scale: u8) -> Vec<u8> {
    p.iter().map(|&c| gf.mul(c, scale)).collect()
}

fn poly_add(p: &[u8], q: &[u8]) -> Vec<u8> {
    let len = p.len().max(q.len());
    let mut out = vec![0u8; len];
    for (i, &c) in p.iter().enumerate() {
        out[i + len - p.len()] ^= c;
    }
    for (i, &c) in q.iter().enumerate() {
        out[i + len - q.len()] ^= c;
    }
    out
}

fn find_errata_locator_roots(gf: &GaloisField, err_loc: &[u8], msg_len: usize) -> Vec<usize> {
    let errs = err_loc.len() - 1;
    let mut pos = Vec::with_capacity(errs);
    for i in 0..msg_len {
        if gf.poly_eval(err_loc, gf.pow(2, -(i as i32))) == 0 {
            pos.push(msg_len - 1 - i);
        }
    }
    pos
}

fn find_error_evaluator(gf: &GaloisField, synd: &[u8], err_loc: &[u8], nsym: usize) -> Vec<u8> {
    let mut full = gf.poly_mul(synd, err_loc);
    if full.len() > nsym + 1 {
        let cut = full.len() - (nsym + 1);
        full = full[cut..].to_vec();
    }
    full
}

fn correct_errata(
    gf: &GaloisField,
    msg: &mut [u8],
    synd: &[u8],
    err_pos: &[usize],
) -> Result<()> {
    let coef_pos: Vec<usize> = err_pos.iter().map(|&p| msg.len() - 1 - p).collect();
    let err_loc = find_erasure_locator(gf, &coef_pos);
    let errs = err_loc.len() - 1;
    let mut synd_rev: Vec<u8> = synd.to_vec();
    synd_rev.reverse();
    let err_eval_full = gf.poly_mul(&synd_rev, &err_loc);
    let keep = errs + 1;
    let err_eval: Vec<u8> = if err_eval_full.len() > keep {
        let cut = err_eval_full.len() - keep;
        err_eval_full[cut..].to_vec()
    } else {
        err_eval_full
    };

    let mut x = Vec::with_capacity(coef_pos.len());
    for &p in &coef_pos {
        x.push(gf.pow(2, p as i32 - 255));
    }

    let mut e = vec![0u8; msg.len()];
    for (i, &xi) in x.iter().enumerate() {
        let xi_inv = gf.inverse(xi);

        let mut err_loc_prime = 1u8;
        for (j, &xj) in x.iter().enumerate() {
            if j != i {
                err_loc_prime = gf.mul(err_loc_prime, 1 ^ gf.mul(xi_inv, xj));
            }
        }
        if err_loc_prime == 0 {
            return Err(PeptideError::CodecFailure(
                "error locator derivative is zero, decode failed".into(),
            ));
        }

        let y = gf.mul(xi, gf.poly_eval(&err_eval, xi_inv));
        let magnitude = gf.div(y, err_loc_prime);
        e[err_pos[i]] = magnitude;
    }

    for (i, &ei) in e.iter().enumerate() {
        msg[i] ^= ei;
    }
    Ok(())
}

/// Decode `msg` (data followed by `nsym` parity bytes), correcting both
/// declared erasures (`erase_pos`, positions within `msg`) and any remaining
/// substitution errors. Returns the corrected data bytes (parity stripped).
pub fn rs_decode_msg(msg: &[u8], nsym: usize, erase_pos: &[usize]) -> Result<Vec<u8>> {
    if nsym == 0 {
        return Ok(msg.to_vec());
    }
    if msg.len() < nsym {
        return Err(PeptideError::CodecFailure(
            "message shorter than parity length".into(),
        ));
    }
    if erase_pos.len() > nsym {
        return Err(PeptideError::CodecFailure(
            "too many erasures to correct".into(),
        ));
    }

    with_gf(|gf| {
        let mut msg = msg.to_vec();
        for &p in erase_pos {
            if p < msg.len() {
                msg[p] = 0;
            }
        }

        let synd = calc_syndromes(gf, &msg, nsym);
        if syndromes_all_zero(&synd) {
            return Ok(msg[..msg.len() - nsym].to_vec());
        }

        let erase_loc = if erase_pos.is_empty() {
            None
        } else {
            let coef_pos: Vec<usize> = erase_pos.iter().map(|&p| msg.len() - 1 - p).collect();
            Some(find_erasure_locator(gf, &coef_pos))
        };

        let err_loc = find_error_locator(gf, &synd, nsym, erase_pos.len(), erase_loc.as_deref())?;
        let err_pos = find_errata_locator_roots(gf, &err_loc, msg.len());
        if err_pos.is_empty() && err_loc.len() > 1 {
            return Err(PeptideError::CodecFailure(
                "could not locate errors, decode failed".into(),
            ));
        }

        correct_errata(gf, &mut msg, &synd, &err_pos)?;

        let final_synd = calc_syndromes(gf, &msg, nsym);
        if !syndromes_all_zero(&final_synd) {
            return Err(PeptideError::CodecFailure(
                "residual syndrome nonzero after correction".into(),
            ));
        }

        let _ = find_error_evaluator; // retained for documentation of the algorithm shape
        Ok(msg[..msg.len() - nsym].to_vec())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip_no_errors() {
        let data = b"reed solomon peptide block";
        let encoded = rs_encode_msg(data, 8);
        let decoded = rs_decode_msg(&encoded, 8, &[]).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn corrects_substitution_errors_within_capacity() {
        let data = b"a block of sixteen";
        let nsym = 8;
        let mut encoded = rs_encode_msg(data, nsym);
        // nsym/2 correctable errors without erasure hints
        encoded[0] ^= 0xFF;
        encoded[3] ^= 0x01;
        encoded[7] ^= 0x55;
        encoded[10] ^= 0x10;
        let decoded = rs_decode_msg(&encoded, nsym, &[]).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn corrects_full_erasures_up_to_nsym() {
        let data = b"erasures only test block!!";
        let nsym = 10;
        let mut encoded = rs_encode_msg(data, nsym);
        let erase_pos = vec![0usize, 2, 4, 6, 8, 9, 11, 13, 15, 17];
        for &p in &erase_pos {
            encoded[p] = 0;
        }
        let decoded = rs_decode_msg(&encoded, nsym, &erase_pos).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn fails_when_too_many_errors() {
        let data = b"short";
        let nsym = 4;
        let mut encoded = rs_encode_msg(data, nsym);
        for b in encoded.iter_mut() {
            *b ^= 0xFF;
        }
        assert!(rs_decode_msg(&encoded, nsym, &[]).is_err());
    }
}
