//! Winnowing: filters a token stream's k-grams down to the subset
//! guaranteed to cover every window of `w + k - 1` tokens, via a
//! rolling hash and a monotonic deque.

use std::collections::VecDeque;

use fallible_iterator::FallibleIterator;

use crate::ids::{Hash, KgramIndex};

/// A large prime used as the polynomial base for the rolling hash. Any
/// odd 64-bit constant works; this one is chosen to spread ASCII token
/// bytes well across the `u64` space.
const POLY_BASE: u64 = 1_000_000_007;

/// One winnow selection: the hash that won its window, the index of the
/// k-gram that produced it, and (optionally) the tokens it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub hash: Hash,
    pub kgram_index: KgramIndex,
    pub tokens: Option<Vec<String>>,
}

/// Per-token hash, used as the polynomial's per-position coefficient.
fn token_hash(token: &str) -> u64 {
    // FNV-1a
    let mut h: u64 = 0xcbf29ce484222325;
    for byte in token.as_bytes() {
        h ^= *byte as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

/// Rolling hash of every k-gram in `tokens`, computed incrementally:
/// `hash[i+1] = hash[i] * POLY_BASE + token_hash(tokens[i+k]) -
/// token_hash(tokens[i]) * POLY_BASE^k` (all arithmetic wraps mod 2^64).
fn kgram_hashes(tokens: &[String], k: usize) -> Vec<Hash> {
    if k == 0 || tokens.len() < k {
        return Vec::new();
    }
    let token_hashes: Vec<u64> = tokens.iter().map(|t| token_hash(t)).collect();

    let mut base_pow_k: u64 = 1;
    for _ in 0..k {
        base_pow_k = base_pow_k.wrapping_mul(POLY_BASE);
    }

    let mut hashes = Vec::with_capacity(token_hashes.len() - k + 1);
    let mut current: u64 = 0;
    for &h in &token_hashes[0..k] {
        current = current.wrapping_mul(POLY_BASE).wrapping_add(h);
    }
    hashes.push(Hash::from(current));

    for i in 1..=(token_hashes.len() - k) {
        let leaving = token_hashes[i - 1];
        let entering = token_hashes[i + k - 1];
        current = current
            .wrapping_sub(leaving.wrapping_mul(base_pow_k))
            .wrapping_mul(POLY_BASE)
            .wrapping_add(entering);
        hashes.push(Hash::from(current));
    }

    hashes
}

/// Winnow `tokens` with k-gram length `k` and window size `w`,
/// returning the selected `(hash, kgramIndex)` pairs in ascending index
/// order. When `keep_tokens` is set, each selection also carries a copy
/// of the tokens it spans (`options.kgramData` in `spec.md` §4.2).
///
/// Lazily evaluated: hashing and window maintenance happen as the
/// returned iterator is driven, not eagerly. Exposed as a
/// [`FallibleIterator`] even though winnowing itself never fails, so
/// that callers threading fallible parser output through the same
/// pipeline (see [`crate::tokenizer`]) share one iterator vocabulary.
pub fn winnow<'a>(
    tokens: &'a [String],
    k: usize,
    w: usize,
    keep_tokens: bool,
) -> impl FallibleIterator<Item = Selection, Error = std::convert::Infallible> + 'a {
    let hashes = kgram_hashes(tokens, k);
    WinnowIter {
        hashes,
        tokens,
        k,
        w: w.max(1),
        keep_tokens,
        next_index: 0,
        deque: VecDeque::new(),
        last_selected_front: None,
        emitted_any: false,
        exhausted: false,
    }
}

struct WinnowIter<'a> {
    hashes: Vec<Hash>,
    tokens: &'a [String],
    k: usize,
    w: usize,
    keep_tokens: bool,
    next_index: usize,
    deque: VecDeque<(Hash, KgramIndex)>,
    last_selected_front: Option<(Hash, KgramIndex)>,
    emitted_any: bool,
    exhausted: bool,
}

impl<'a> WinnowIter<'a> {
    fn make_selection(&self, hash: Hash, kgram_index: KgramIndex) -> Selection {
        Selection {
            hash,
            kgram_index,
            tokens: self
                .keep_tokens
                .then(|| self.tokens[kgram_index..kgram_index + self.k].to_vec()),
        }
    }
}

impl<'a> FallibleIterator for WinnowIter<'a> {
    type Item = Selection;
    type Error = std::convert::Infallible;

    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        if self.exhausted {
            return Ok(None);
        }

        while self.next_index < self.hashes.len() {
            let index = self.next_index;
            let hash = self.hashes[index];
            self.next_index += 1;

            // Rightmost tie-break: evict deque entries with hash >= the
            // incoming one, so ties resolve to whichever k-gram enters
            // last (i.e. the rightmost).
            while matches!(self.deque.back(), Some((back_hash, _)) if *back_hash >= hash) {
                self.deque.pop_back();
            }
            self.deque.push_back((hash, index));

            while matches!(self.deque.front(), Some((_, front_index)) if *front_index + self.w <= index) {
                self.deque.pop_front();
            }

            let window_filled = index + 1 >= self.w;
            if !window_filled {
                continue;
            }

            let front = *self.deque.front().expect("deque non-empty once filled");
            let just_filled = index + 1 == self.w;
            let front_changed = self.last_selected_front != Some(front);

            if just_filled || front_changed {
                self.last_selected_front = Some(front);
                self.emitted_any = true;
                return Ok(Some(self.make_selection(front.0, front.1)));
            }
        }

        // `tokens.len() < k + w - 1`: the window never reached full size.
        // Flush one selection from the partial deque so short files still
        // yield a fingerprint, per the boundary behavior in `spec.md` §4.2.
        self.exhausted = true;
        if !self.emitted_any {
            if let Some(front) = self.deque.front().copied() {
                return Ok(Some(self.make_selection(front.0, front.1)));
            }
        }
        Ok(None)
    }
}
