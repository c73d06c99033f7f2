use super::{Interval, Volume, VolumeMut, MAX_DIMENSIONS};

/// View of a volume translated so its bounding box starts at the origin.
///
/// A source that already starts at the origin is forwarded as is.
#[derive(Debug, Clone)]
pub struct ZeroMin<V> {
    source: V,
    interval: Interval,
    offset: Option<Vec<i64>>,
}

pub fn zero_min<V: Volume>(source: V) -> ZeroMin<V> {
    let src = source.interval();
    let (interval, offset) = if src.is_zero_min() {
        (src.clone(), None)
    } else {
        (src.at_origin(), Some(src.mins().to_vec()))
    };
    ZeroMin {
        source,
        interval,
        offset,
    }
}

impl<V> ZeroMin<V> {
    pub fn is_translated(&self) -> bool {
        self.offset.is_some()
    }
    pub fn source(&self) -> &V {
        &self.source
    }
    pub fn source_mut(&mut self) -> &mut V {
        &mut self.source
    }
    pub fn into_inner(self) -> V {
        self.source
    }
}

fn translate(pos: &[i64], offset: &[i64]) -> [i64; MAX_DIMENSIONS] {
    let mut abs = [0i64; MAX_DIMENSIONS];
    for (d, (p, o)) in pos.iter().zip(offset).enumerate() {
        abs[d] = p + o;
    }
    abs
}

impl<V: Volume> Volume for ZeroMin<V> {
    type Sample = V::Sample;

    fn interval(&self) -> &Interval {
        &self.interval
    }
    fn get(&self, pos: &[i64]) -> V::Sample {
        match &self.offset {
            None => self.source.get(pos),
            Some(offset) => self.source.get(&translate(pos, offset)[..pos.len()]),
        }
    }
}
impl<V: VolumeMut> VolumeMut for ZeroMin<V> {
    fn set(&mut self, pos: &[i64], value: V::Sample) {
        match &self.offset {
            None => self.source.set(pos, value),
            Some(offset) => {
                let abs = translate(pos, offset);
                self.source.set(&abs[..pos.len()], value)
            }
        }
    }
}
