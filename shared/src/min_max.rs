use glam::{U16Vec2, UVec2};

/// Some area defined by a minimum and maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinMax<T> {
	pub min: T,
	pub max: T,
}

impl<T> MinMax<T> where T: Clone {
	pub fn new(a: T) -> Self {
		Self { min: a.clone(), max: a }
	}
}

pub trait VecMinMax<T> {
	fn update(&mut self, v: T);
	fn size(&self) -> T;
	fn contains(&self, other: &Self) -> bool;
	fn intersects(&self, other: &Self) -> bool;
}

macro_rules! impl_vec_min_max {
	($($type:ty),*) => {
		$(
			impl VecMinMax<$type> for MinMax<$type> {
				fn update(&mut self, a: $type) {
					self.min = self.min.min(a);
					self.max = self.max.max(a);
				}
				
				fn size(&self) -> $type {
					self.max - self.min
				}
				
				fn contains(&self, other: &Self) -> bool {
					self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
				}
				
				fn intersects(&self, other: &Self) -> bool {
					self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
				}
			}
		)*
	};
}

impl_vec_min_max!(U16Vec2, UVec2);

pub trait VecMinMaxFromIterator: Iterator {
	fn min_max(self) -> Option<MinMax<Self::Item>>;
}

impl<I> VecMinMaxFromIterator for I where I: Iterator, I::Item: Clone, MinMax<I::Item>: VecMinMax<I::Item> {
	fn min_max(mut self) -> Option<MinMax<Self::Item>> {
		let mut min_max = MinMax::new(self.next()?);
		for a in self {
			min_max.update(a);
		}
		Some(min_max)
	}
}
