use std::io::{Read, Result};
use arrayvec::ArrayVec;
use byteorder::{ReadBytesExt, LE};
use glam::{IVec3, U16Vec2};
use crate::Readable;

impl Readable for u8 {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		reader.read_u8()
	}
}

impl Readable for i8 {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		reader.read_i8()
	}
}

//wider primitives are little-endian on disk
macro_rules! readable_le {
	($($type:ty => $func:ident),* $(,)?) => {
		$(
			impl Readable for $type {
				fn read<R: Read>(reader: &mut R) -> Result<Self> {
					reader.$func::<LE>()
				}
			}
		)*
	};
}

readable_le! {
	u16 => read_u16,
	i16 => read_i16,
	u32 => read_u32,
	i32 => read_i32,
	f32 => read_f32,
}

impl<T: Readable, const N: usize> Readable for [T; N] {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		let items = (0..N).map(|_| T::read(reader)).collect::<Result<ArrayVec<T, N>>>()?;
		match items.into_inner() {
			Ok(array) => Ok(array),
			Err(_) => unreachable!("collected exactly N items"),
		}
	}
}

impl Readable for U16Vec2 {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		<[u16; 2]>::read(reader).map(Self::from)
	}
}

impl Readable for IVec3 {
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		<[i32; 3]>::read(reader).map(Self::from)
	}
}
