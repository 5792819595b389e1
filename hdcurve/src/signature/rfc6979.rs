//! Deterministic ECDSA nonces (RFC 6979, HMAC-SHA256 DRBG)

use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroizing;

use crate::error::Result;
use crate::field::to_fixed_bytes;
use crate::hash::hmac_sha256;

/// Stream of nonce candidates in `[1, q)`; each call to `next_nonce` yields
/// the next candidate of the RFC 6979 §3.2 step h loop.
pub(crate) struct NonceGenerator {
    order: BigUint,
    k: Zeroizing<[u8; 32]>,
    v: Zeroizing<[u8; 32]>,
    retry: bool,
}

impl NonceGenerator {
    /// `secret` is the private scalar, `digest` the message hash and `extra`
    /// optional additional data (§3.6).
    pub(crate) fn new(order: &BigUint, secret: &BigUint, digest: &[u8], extra: Option<&[u8]>) -> Result<Self> {
        let rlen = byte_len(order);
        let x = Zeroizing::new(to_fixed_bytes(secret, rlen));
        let h1 = to_fixed_bytes(&(bits2int(digest, order) % order), rlen);
        let extra = extra.unwrap_or(&[]);

        let mut k = Zeroizing::new([0u8; 32]);
        let mut v = Zeroizing::new([1u8; 32]);

        *k = hmac_sha256(&*k, &[&*v, &[0x00], &x, &h1, extra])?;
        *v = hmac_sha256(&*k, &[&*v])?;
        *k = hmac_sha256(&*k, &[&*v, &[0x01], &x, &h1, extra])?;
        *v = hmac_sha256(&*k, &[&*v])?;

        Ok(Self {
            order: order.clone(),
            k,
            v,
            retry: false,
        })
    }

    pub(crate) fn next_nonce(&mut self) -> Result<BigUint> {
        let qlen = self.order.bits() as usize;
        loop {
            if self.retry {
                *self.k = hmac_sha256(&*self.k, &[&*self.v, &[0x00]])?;
                *self.v = hmac_sha256(&*self.k, &[&*self.v])?;
            }
            self.retry = true;

            let mut t = Zeroizing::new(Vec::with_capacity(qlen / 8 + 32));
            while t.len() * 8 < qlen {
                *self.v = hmac_sha256(&*self.k, &[&*self.v])?;
                t.extend_from_slice(&*self.v);
            }

            let candidate = bits2int(&t, &self.order);
            if !candidate.is_zero() && candidate < self.order {
                return Ok(candidate);
            }
        }
    }
}

fn byte_len(order: &BigUint) -> usize {
    (order.bits() as usize + 7) / 8
}

/// Leftmost `qlen` bits of `bytes` as an integer
pub(crate) fn bits2int(bytes: &[u8], order: &BigUint) -> BigUint {
    let qlen = order.bits() as usize;
    let value = BigUint::from_bytes_be(bytes);
    let blen = bytes.len() * 8;
    if blen > qlen {
        value >> (blen - qlen)
    } else {
        value
    }
}
