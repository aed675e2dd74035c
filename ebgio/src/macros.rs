/// Generates little-endian integer accessors on [`BlockIOExt`](crate::BlockIOExt).
#[macro_export]
macro_rules! blockio_impl_primitive_rw {
    ($($ty:ty),+ $(,)?) => {
        $(
            paste::paste! {
                #[doc = concat!("Reads a little-endian `", stringify!($ty), "` at `offset`.")]
                #[inline(always)]
                fn [<read_ $ty _at>](&mut self, offset: u64) -> BlockIOResult<$ty> {
                    let mut buf = [0u8; core::mem::size_of::<$ty>()];
                    self.read_at(offset, &mut buf)?;
                    Ok(<$ty>::from_le_bytes(buf))
                }

                #[doc = concat!("Writes a little-endian `", stringify!($ty), "` at `offset`.")]
                #[inline(always)]
                fn [<write_ $ty _at>](&mut self, offset: u64, value: $ty) -> BlockIOResult {
                    self.write_at(offset, &value.to_le_bytes())
                }
            }
        )+
    };
}
