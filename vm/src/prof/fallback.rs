macro_rules! span {
    ($name: expr) => {
        ()
    };
}

#[inline(always)]
pub fn start() {}

#[inline(always)]
pub fn frame_mark() {}

pub(crate) use span;
