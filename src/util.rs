use rand::Rng;

/// Uniform random choice from any iterator, using a caller-supplied source of
/// randomness.
///
/// Sampling uniformly over the collected items is what makes reading an
/// attribute off the sampled item equivalent to sampling that attribute's
/// posterior, so resolution code must always come through here rather than
/// improvising its own pick.
pub trait SwwIteratorExt: Iterator + Sized {
    fn choose_uniform<R: Rng>(self, rng: &mut R) -> Option<Self::Item> {
        let mut v = self.collect::<Vec<_>>();
        if v.is_empty() {
            None
        } else {
            let len = v.len();
            Some(v.swap_remove(rng.gen_range(0..len)))
        }
    }
}

impl<T: Iterator> SwwIteratorExt for T {}
